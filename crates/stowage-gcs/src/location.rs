//! Cloud Storage accounts as [`Location`]s.

use std::sync::Arc;

use stowage_core::{Container, Cursor, Item, Location, Page, Result};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::client::{ClientHandle, ListQuery, StorageClient};
use crate::container::GcsContainer;
use crate::{GcsConfig, TRACING_TARGET, resolver};

/// A Google Cloud Storage project.
///
/// Containers and items obtained from a location share its client handle,
/// so they honour the same timeout and cancellation token and stay usable
/// after [`close`](Location::close).
#[derive(Debug, Clone)]
pub struct GcsLocation {
    config: Arc<GcsConfig>,
    handle: ClientHandle,
}

impl GcsLocation {
    /// Creates a location over an existing storage client.
    pub fn new(config: GcsConfig, client: impl StorageClient + 'static) -> Self {
        Self::with_client(config, Arc::new(client))
    }

    /// Creates a location over a shared storage client.
    pub fn with_client(config: GcsConfig, client: Arc<dyn StorageClient>) -> Self {
        tracing::debug!(
            target: TRACING_TARGET,
            project_id = %config.project_id,
            client = ?client,
            "Creating location"
        );

        let handle = ClientHandle::new(client, config.timeout());
        Self {
            config: Arc::new(config),
            handle,
        }
    }

    /// Creates a location talking to the JSON API.
    #[cfg(feature = "reqwest")]
    #[cfg_attr(docsrs, doc(cfg(feature = "reqwest")))]
    pub fn connect(config: GcsConfig) -> Result<Self> {
        let client = crate::client::ReqwestClient::new(config.clone())?;
        Ok(Self::new(config, client))
    }

    /// Location configuration.
    pub fn config(&self) -> &GcsConfig {
        &self.config
    }

    /// Token that cancels every call made through this location and the
    /// containers and items derived from it.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.handle.cancellation_token().clone()
    }

    fn container_view(&self, name: impl Into<String>) -> GcsContainer {
        GcsContainer::new(name, self.handle.clone())
    }
}

#[async_trait::async_trait]
impl Location for GcsLocation {
    #[tracing::instrument(name = "location.create_container", skip(self))]
    async fn create_container(&self, name: &str) -> Result<Box<dyn Container>> {
        let attrs = self
            .handle
            .call(
                "bucket.create",
                self.handle
                    .client()
                    .create_bucket(&self.config.project_id, name),
            )
            .await?;

        tracing::debug!(target: TRACING_TARGET, bucket = %attrs.name, "Created container");
        Ok(Box::new(self.container_view(attrs.name)))
    }

    #[tracing::instrument(name = "location.containers", skip(self, cursor))]
    async fn containers(
        &self,
        prefix: &str,
        cursor: &Cursor,
        count: usize,
    ) -> Result<Page<Box<dyn Container>>> {
        let query = ListQuery::new(prefix, cursor, count);
        let listed = self
            .handle
            .call(
                "bucket.list",
                self.handle
                    .client()
                    .list_buckets(&self.config.project_id, &query),
            )
            .await?;

        let containers = listed
            .items
            .into_iter()
            .map(|attrs| Box::new(self.container_view(attrs.name)) as Box<dyn Container>)
            .collect();

        Ok(Page::new(containers, listed.next_cursor))
    }

    #[tracing::instrument(name = "location.container", skip(self))]
    async fn container(&self, id: &str) -> Result<Box<dyn Container>> {
        let attrs = self
            .handle
            .call("bucket.attrs", self.handle.client().bucket_attrs(id))
            .await
            .map_err(|e| e.into_not_found(format!("container '{id}' not found")))?;

        Ok(Box::new(self.container_view(attrs.name)))
    }

    #[tracing::instrument(name = "location.remove_container", skip(self))]
    async fn remove_container(&self, id: &str) -> Result<()> {
        self.handle
            .call("bucket.delete", self.handle.client().delete_bucket(id))
            .await
    }

    #[tracing::instrument(name = "location.item_by_url", skip(self, url), fields(url = %url))]
    async fn item_by_url(&self, url: &Url) -> Result<Box<dyn Item>> {
        let target = resolver::parse_item_url(url)?;

        let container = self.container(&target.container).await?;
        container.item(&target.item).await
    }

    async fn close(&self) -> Result<()> {
        tracing::debug!(
            target: TRACING_TARGET,
            project_id = %self.config.project_id,
            "Closed location"
        );
        Ok(())
    }
}
