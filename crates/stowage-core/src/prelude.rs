//! Convenient re-exports for common use.

pub use crate::registry::{Backend, Registry};
pub use crate::walk::{walk_containers, walk_items};
pub use crate::{
    ByteStream, Config, Container, ContentReader, Cursor, Error, ErrorKind, Item, Location,
    Metadata, MetadataValue, Page, Result,
};
