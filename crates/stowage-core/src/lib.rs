#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod error;
mod metadata;
mod page;
mod storage;

pub mod registry;
pub mod walk;

#[doc(hidden)]
pub mod prelude;

pub use config::Config;
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use metadata::{Metadata, MetadataValue};
pub use page::{Cursor, Page};
pub use registry::{Backend, Registry};
pub use storage::{ByteStream, Container, ContentReader, Item, Location};

/// Tracing target for abstraction-level operations.
pub const TRACING_TARGET: &str = "stowage_core";
