//! Cloud Storage buckets as [`Container`]s.

use futures::future::try_join_all;
use stowage_core::{Container, ContentReader, Cursor, Item, Metadata, Page, Result};

use crate::client::{ClientHandle, ListQuery, ObjectWrite};
use crate::item::GcsItem;
use crate::{TRACING_TARGET, codec};

/// A Cloud Storage bucket.
#[derive(Debug, Clone)]
pub struct GcsContainer {
    name: String,
    handle: ClientHandle,
}

impl GcsContainer {
    pub(crate) fn new(name: impl Into<String>, handle: ClientHandle) -> Self {
        Self {
            name: name.into(),
            handle,
        }
    }

    /// Bucket name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn handle(&self) -> &ClientHandle {
        &self.handle
    }

    /// Fetches current attributes for `name` and builds the item from them.
    async fn attributed(&self, name: &str) -> Result<GcsItem> {
        let attrs = self
            .handle
            .call(
                "object.attrs",
                self.handle.client().object_attrs(&self.name, name),
            )
            .await?;

        GcsItem::from_attrs(self.clone(), attrs)
    }
}

#[async_trait::async_trait]
impl Container for GcsContainer {
    fn id(&self) -> &str {
        &self.name
    }

    fn name(&self) -> &str {
        &self.name
    }

    #[tracing::instrument(name = "container.item", skip(self), fields(bucket = %self.name))]
    async fn item(&self, id: &str) -> Result<Box<dyn Item>> {
        let item = self.attributed(id).await.map_err(|e| {
            e.into_not_found(format!("item '{id}' not found in container '{}'", self.name))
        })?;

        Ok(Box::new(item))
    }

    #[tracing::instrument(name = "container.items", skip(self, cursor), fields(bucket = %self.name))]
    async fn items(
        &self,
        prefix: &str,
        cursor: &Cursor,
        count: usize,
    ) -> Result<Page<Box<dyn Item>>> {
        let query = ListQuery::new(prefix, cursor, count);
        let listed = self
            .handle
            .call(
                "object.list",
                self.handle.client().list_objects(&self.name, &query),
            )
            .await?;

        // Each listed object is read back so items carry current attributes.
        let items = try_join_all(listed.items.iter().map(|attrs| self.attributed(&attrs.name)))
            .await?
            .into_iter()
            .map(|item| Box::new(item) as Box<dyn Item>)
            .collect::<Vec<_>>();

        tracing::debug!(
            target: TRACING_TARGET,
            bucket = %self.name,
            prefix,
            count = items.len(),
            more = listed.next_cursor.is_some(),
            "Listed items"
        );

        Ok(Page::new(items, listed.next_cursor))
    }

    #[tracing::instrument(name = "container.remove_item", skip(self), fields(bucket = %self.name))]
    async fn remove_item(&self, id: &str) -> Result<()> {
        self.handle
            .call(
                "object.delete",
                self.handle.client().delete_object(&self.name, id),
            )
            .await
    }

    #[tracing::instrument(
        name = "container.put",
        skip(self, content, metadata),
        fields(bucket = %self.name)
    )]
    async fn put(
        &self,
        name: &str,
        content: ContentReader,
        size: u64,
        metadata: Metadata,
    ) -> Result<Box<dyn Item>> {
        let native = codec::encode(&metadata)?;

        let write = ObjectWrite::new(content)
            .with_size_hint(size)
            .with_metadata(native);
        self.handle
            .call(
                "object.write",
                self.handle.client().write_object(&self.name, name, write),
            )
            .await?;

        let item = self.attributed(name).await?;
        if item.size() != size {
            tracing::warn!(
                target: TRACING_TARGET,
                bucket = %self.name,
                object = name,
                declared = size,
                stored = item.size(),
                "Stored size differs from declared size"
            );
        }

        Ok(Box::new(item))
    }
}
