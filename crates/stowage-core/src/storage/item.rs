//! Read-only view of a stored object.

use std::fmt;

use bytes::{Bytes, BytesMut};
use futures::TryStreamExt;
use jiff::Timestamp;
use url::Url;

use super::ByteStream;
use crate::{Metadata, Result};

/// Upper bound on the buffer reserved up front by [`Item::read`].
const MAX_READ_PREALLOC: u64 = 8 * 1024 * 1024;

/// A single object inside a [`Container`](super::Container).
///
/// Every accessor returns data captured when the item was fetched, listed or
/// written; none of them talk to the backend. Fetch the item again to observe
/// later changes.
#[async_trait::async_trait]
pub trait Item: Send + Sync + fmt::Debug {
    /// Identifier of the item within its container.
    fn id(&self) -> &str;

    /// Display name of the item.
    fn name(&self) -> &str;

    /// Identifier of the container holding this item.
    fn container_id(&self) -> &str;

    /// Size of the stored content in bytes.
    fn size(&self) -> u64;

    /// Hex-encoded content digest, in the backend's native algorithm.
    fn hash(&self) -> &str;

    /// Time of the last modification.
    fn last_modified(&self) -> Timestamp;

    /// Backend URL that resolves back to this item.
    fn url(&self) -> &Url;

    /// Metadata stored alongside the content.
    fn metadata(&self) -> &Metadata;

    /// Opens a read stream over the item's content.
    ///
    /// The stream owns whatever backend resources it needs and releases them
    /// when dropped, whether it was drained, abandoned or failed mid-read.
    async fn open(&self) -> Result<ByteStream>;

    /// Reads the whole content into memory.
    async fn read(&self) -> Result<Bytes> {
        let mut stream = self.open().await?;
        let mut buffer = BytesMut::with_capacity(self.size().min(MAX_READ_PREALLOC) as usize);

        while let Some(chunk) = stream.try_next().await? {
            buffer.extend_from_slice(&chunk);
        }

        Ok(buffer.freeze())
    }
}
