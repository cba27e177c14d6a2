//! The location, container and item abstraction.

mod container;
mod item;
mod location;

use std::pin::Pin;

use bytes::Bytes;
use futures::stream::BoxStream;
use tokio::io::AsyncRead;

pub use container::Container;
pub use item::Item;
pub use location::Location;

use crate::Result;

/// Stream of content chunks produced by [`Item::open`].
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Content source consumed by [`Container::put`].
pub type ContentReader = Pin<Box<dyn AsyncRead + Send>>;
