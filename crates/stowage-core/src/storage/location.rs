//! Account-scoped operations.

use std::fmt;

use url::Url;

use super::{Container, Item};
use crate::{Cursor, Page, Result};

/// A configured account on a storage backend.
#[async_trait::async_trait]
pub trait Location: Send + Sync + fmt::Debug {
    /// Creates a new container.
    async fn create_container(&self, name: &str) -> Result<Box<dyn Container>>;

    /// Lists containers whose name starts with `prefix`.
    async fn containers(
        &self,
        prefix: &str,
        cursor: &Cursor,
        count: usize,
    ) -> Result<Page<Box<dyn Container>>>;

    /// Looks up an existing container.
    ///
    /// Fails with [`ErrorKind::NotFound`](crate::ErrorKind::NotFound) when the
    /// container cannot be retrieved.
    async fn container(&self, id: &str) -> Result<Box<dyn Container>>;

    /// Deletes a container. Backends refuse to delete non-empty containers.
    async fn remove_container(&self, id: &str) -> Result<()>;

    /// Resolves a backend URL to the item it names.
    async fn item_by_url(&self, url: &Url) -> Result<Box<dyn Item>>;

    /// Releases location resources. Safe to call repeatedly; containers and
    /// items obtained earlier stay usable.
    async fn close(&self) -> Result<()>;
}
