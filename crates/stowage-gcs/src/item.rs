//! Cloud Storage objects as [`Item`]s.

use jiff::Timestamp;
use stowage_core::{ByteStream, Item, Metadata, Result};
use url::Url;

use crate::client::ObjectAttrs;
use crate::container::GcsContainer;
use crate::{codec, resolver};

/// A Cloud Storage object.
///
/// Holds a snapshot of the object's attributes taken when it was fetched,
/// listed or written, plus a handle on its bucket for reading content.
#[derive(Debug, Clone)]
pub struct GcsItem {
    container: GcsContainer,
    name: String,
    size: u64,
    hash: String,
    last_modified: Timestamp,
    url: Url,
    metadata: Metadata,
    content_type: Option<String>,
}

impl GcsItem {
    pub(crate) fn from_attrs(container: GcsContainer, attrs: ObjectAttrs) -> Result<Self> {
        let url = resolver::item_url(&attrs.media_link)?;

        Ok(Self {
            container,
            size: attrs.size,
            hash: hex::encode(&attrs.md5),
            last_modified: attrs.updated,
            url,
            metadata: codec::decode(&attrs.metadata),
            content_type: attrs.content_type,
            name: attrs.name,
        })
    }

    /// Bucket holding this object.
    pub fn container(&self) -> &GcsContainer {
        &self.container
    }

    /// Content type recorded by the service.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}

#[async_trait::async_trait]
impl Item for GcsItem {
    fn id(&self) -> &str {
        &self.name
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn container_id(&self) -> &str {
        self.container.name()
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn hash(&self) -> &str {
        &self.hash
    }

    fn last_modified(&self) -> Timestamp {
        self.last_modified
    }

    fn url(&self) -> &Url {
        &self.url
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    #[tracing::instrument(
        name = "item.open",
        skip(self),
        fields(bucket = %self.container.name(), object = %self.name)
    )]
    async fn open(&self) -> Result<ByteStream> {
        let handle = self.container.handle();
        let stream = handle
            .call(
                "object.read",
                handle.client().read_object(self.container.name(), &self.name),
            )
            .await?;

        Ok(handle.guard_stream("object.read", stream))
    }
}
