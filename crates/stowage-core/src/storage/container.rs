//! Bucket-scoped operations.

use std::fmt;

use super::{ContentReader, Item};
use crate::{Cursor, Metadata, Page, Result};

/// A named collection of items, such as a bucket.
#[async_trait::async_trait]
pub trait Container: Send + Sync + fmt::Debug {
    /// Identifier of the container.
    fn id(&self) -> &str;

    /// Display name of the container.
    fn name(&self) -> &str;

    /// Fetches a single item by id.
    ///
    /// Fails with [`ErrorKind::NotFound`](crate::ErrorKind::NotFound) when the
    /// item cannot be retrieved.
    async fn item(&self, id: &str) -> Result<Box<dyn Item>>;

    /// Lists items whose id starts with `prefix`.
    ///
    /// At most `count` items are returned per page. Pass [`Cursor::start`] to
    /// begin and the returned [`Page::next`] to continue.
    async fn items(
        &self,
        prefix: &str,
        cursor: &Cursor,
        count: usize,
    ) -> Result<Page<Box<dyn Item>>>;

    /// Deletes an item.
    async fn remove_item(&self, id: &str) -> Result<()>;

    /// Writes `content` to a new or replacing item and returns the item as
    /// the backend stored it.
    ///
    /// `size` is the caller's declaration of the content length; the returned
    /// item reports what the backend actually holds.
    async fn put(
        &self,
        name: &str,
        content: ContentReader,
        size: u64,
        metadata: Metadata,
    ) -> Result<Box<dyn Item>>;
}
