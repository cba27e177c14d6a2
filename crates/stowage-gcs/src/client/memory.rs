//! In-process [`StorageClient`] holding buckets and objects in memory.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use bytes::Bytes;
use futures::StreamExt;
use jiff::Timestamp;
use stowage_core::ByteStream;
use tokio::io::AsyncReadExt;
use tokio::sync::RwLock;

use super::{
    BucketAttrs, ClientError, ClientResult, ListPage, ListQuery, ObjectAttrs, ObjectWrite,
    StorageClient,
};
use crate::config::DEFAULT_ENDPOINT;
use crate::resolver::encode_segment;

/// Page size used when a list query leaves it to the client.
const DEFAULT_PAGE_SIZE: usize = 1000;

/// Content type recorded when a write names none.
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Size of the chunks yielded by [`MemoryClient::read_object`].
const READ_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    md5: [u8; 16],
    generation: u64,
    updated: Timestamp,
    content_type: Option<String>,
    metadata: HashMap<String, String>,
}

#[derive(Debug)]
struct StoredBucket {
    attrs: BucketAttrs,
    project_id: String,
    objects: BTreeMap<String, StoredObject>,
}

#[derive(Debug, Default)]
struct State {
    buckets: BTreeMap<String, StoredBucket>,
    generation: u64,
}

/// A [`StorageClient`] that keeps buckets and objects in process memory.
///
/// Behaves like the JSON API where it matters to callers: names list in
/// lexicographic order, continuation tokens are opaque, deleting a non-empty
/// bucket is refused and media links follow the service's download layout.
/// Clones share the same state.
#[derive(Clone)]
pub struct MemoryClient {
    endpoint: Arc<str>,
    state: Arc<RwLock<State>>,
}

impl std::fmt::Debug for MemoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl Default for MemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryClient {
    /// Creates an empty client issuing media links on the public endpoint.
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Creates an empty client issuing media links on `endpoint`.
    pub fn with_endpoint(endpoint: impl AsRef<str>) -> Self {
        Self {
            endpoint: Arc::from(endpoint.as_ref().trim_end_matches('/')),
            state: Arc::default(),
        }
    }

    fn media_link(&self, bucket: &str, name: &str, generation: u64) -> String {
        format!(
            "{}/download/storage/v1/b/{}/o/{}?generation={generation}&alt=media",
            self.endpoint,
            encode_segment(bucket),
            encode_segment(name),
        )
    }

    fn attrs_of(&self, bucket: &str, name: &str, object: &StoredObject) -> ObjectAttrs {
        ObjectAttrs {
            bucket: bucket.to_string(),
            name: name.to_string(),
            size: object.data.len() as u64,
            md5: object.md5.to_vec(),
            updated: object.updated,
            media_link: self.media_link(bucket, name, object.generation),
            content_type: object.content_type.clone(),
            metadata: object.metadata.clone(),
        }
    }
}

fn encode_cursor(last: &str) -> String {
    URL_SAFE_NO_PAD.encode(last)
}

fn decode_cursor(token: &str) -> ClientResult<String> {
    URL_SAFE_NO_PAD
        .decode(token)
        .ok()
        .and_then(|raw| String::from_utf8(raw).ok())
        .ok_or_else(|| ClientError::invalid_request(format!("invalid page token '{token}'")))
}

/// Slices one page out of names in ascending order.
fn paginate<'a, T: 'a>(
    entries: impl Iterator<Item = (&'a String, T)>,
    query: &ListQuery,
) -> ClientResult<(Vec<(&'a String, T)>, Option<String>)> {
    let after = query.cursor.as_deref().map(decode_cursor).transpose()?;
    let prefix = query.prefix.as_deref().unwrap_or_default();
    let limit = match query.page_size {
        0 => DEFAULT_PAGE_SIZE,
        n => n,
    };

    let mut matching = entries
        .filter(|(name, _)| name.starts_with(prefix))
        .filter(|(name, _)| after.as_deref().is_none_or(|after| name.as_str() > after))
        .peekable();

    let mut page = Vec::with_capacity(limit.min(64));
    while page.len() < limit {
        match matching.next() {
            Some(entry) => page.push(entry),
            None => break,
        }
    }

    let next = match (matching.peek(), page.last()) {
        (Some(_), Some((last, _))) => Some(encode_cursor(last)),
        _ => None,
    };
    Ok((page, next))
}

#[async_trait::async_trait]
impl StorageClient for MemoryClient {
    async fn create_bucket(&self, project_id: &str, name: &str) -> ClientResult<BucketAttrs> {
        if name.is_empty() {
            return Err(ClientError::invalid_request("bucket name must not be empty"));
        }

        let mut state = self.state.write().await;
        if state.buckets.contains_key(name) {
            return Err(ClientError::conflict(format!("bucket '{name}' already exists")));
        }

        let attrs = BucketAttrs {
            name: name.to_string(),
            created: Some(Timestamp::now()),
            location: Some("US".to_string()),
        };
        state.buckets.insert(
            name.to_string(),
            StoredBucket {
                attrs: attrs.clone(),
                project_id: project_id.to_string(),
                objects: BTreeMap::new(),
            },
        );
        Ok(attrs)
    }

    async fn delete_bucket(&self, name: &str) -> ClientResult<()> {
        let mut state = self.state.write().await;
        let bucket = state
            .buckets
            .get(name)
            .ok_or_else(|| ClientError::not_found(format!("bucket '{name}'")))?;

        if !bucket.objects.is_empty() {
            return Err(ClientError::conflict(format!("bucket '{name}' is not empty")));
        }

        state.buckets.remove(name);
        Ok(())
    }

    async fn bucket_attrs(&self, name: &str) -> ClientResult<BucketAttrs> {
        let state = self.state.read().await;
        state
            .buckets
            .get(name)
            .map(|bucket| bucket.attrs.clone())
            .ok_or_else(|| ClientError::not_found(format!("bucket '{name}'")))
    }

    async fn list_buckets(
        &self,
        project_id: &str,
        query: &ListQuery,
    ) -> ClientResult<ListPage<BucketAttrs>> {
        let state = self.state.read().await;
        let owned = state
            .buckets
            .iter()
            .filter(|(_, bucket)| bucket.project_id == project_id);

        let (page, next) = paginate(owned, query)?;
        let items = page
            .into_iter()
            .map(|(_, bucket)| bucket.attrs.clone())
            .collect();
        Ok(ListPage::new(items, next))
    }

    async fn object_attrs(&self, bucket: &str, name: &str) -> ClientResult<ObjectAttrs> {
        let state = self.state.read().await;
        let stored = state
            .buckets
            .get(bucket)
            .ok_or_else(|| ClientError::not_found(format!("bucket '{bucket}'")))?;

        stored
            .objects
            .get(name)
            .map(|object| self.attrs_of(bucket, name, object))
            .ok_or_else(|| ClientError::not_found(format!("object '{bucket}/{name}'")))
    }

    async fn list_objects(
        &self,
        bucket: &str,
        query: &ListQuery,
    ) -> ClientResult<ListPage<ObjectAttrs>> {
        let state = self.state.read().await;
        let stored = state
            .buckets
            .get(bucket)
            .ok_or_else(|| ClientError::not_found(format!("bucket '{bucket}'")))?;

        let (page, next) = paginate(stored.objects.iter(), query)?;
        let items = page
            .into_iter()
            .map(|(name, object)| self.attrs_of(bucket, name, object))
            .collect();
        Ok(ListPage::new(items, next))
    }

    async fn delete_object(&self, bucket: &str, name: &str) -> ClientResult<()> {
        let mut state = self.state.write().await;
        let stored = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| ClientError::not_found(format!("bucket '{bucket}'")))?;

        stored
            .objects
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| ClientError::not_found(format!("object '{bucket}/{name}'")))
    }

    async fn write_object(
        &self,
        bucket: &str,
        name: &str,
        write: ObjectWrite,
    ) -> ClientResult<()> {
        if name.is_empty() {
            return Err(ClientError::invalid_request("object name must not be empty"));
        }
        if !self.state.read().await.buckets.contains_key(bucket) {
            return Err(ClientError::not_found(format!("bucket '{bucket}'")));
        }

        let mut data = Vec::with_capacity(write.prealloc());
        let mut content = write.content;
        content.read_to_end(&mut data).await?;

        let mut state = self.state.write().await;
        state.generation += 1;
        let generation = state.generation;

        let stored = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| ClientError::not_found(format!("bucket '{bucket}'")))?;

        stored.objects.insert(
            name.to_string(),
            StoredObject {
                md5: md5::compute(&data).0,
                data: Bytes::from(data),
                generation,
                updated: Timestamp::now(),
                content_type: Some(
                    write
                        .content_type
                        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
                ),
                metadata: write.metadata,
            },
        );
        Ok(())
    }

    async fn read_object(&self, bucket: &str, name: &str) -> ClientResult<ByteStream> {
        let data = {
            let state = self.state.read().await;
            state
                .buckets
                .get(bucket)
                .and_then(|stored| stored.objects.get(name))
                .map(|object| object.data.clone())
                .ok_or_else(|| ClientError::not_found(format!("object '{bucket}/{name}'")))?
        };

        let chunks: Vec<stowage_core::Result<Bytes>> = (0..data.len())
            .step_by(READ_CHUNK_SIZE)
            .map(|start| Ok(data.slice(start..data.len().min(start + READ_CHUNK_SIZE))))
            .collect();
        Ok(futures::stream::iter(chunks).boxed())
    }
}

#[cfg(test)]
mod tests {
    use futures::TryStreamExt;
    use stowage_core::Cursor;

    use super::*;

    fn upload(data: &'static [u8]) -> ObjectWrite {
        ObjectWrite::new(Box::pin(data)).with_size_hint(data.len() as u64)
    }

    async fn client_with_objects(names: &[&str]) -> MemoryClient {
        let client = MemoryClient::new();
        client.create_bucket("p", "b").await.unwrap();
        for name in names {
            client.write_object("b", name, upload(b"x")).await.unwrap();
        }
        client
    }

    #[tokio::test]
    async fn test_bucket_lifecycle() {
        let client = MemoryClient::new();
        client.create_bucket("p", "b1").await.unwrap();

        let err = client.create_bucket("p", "b1").await.unwrap_err();
        assert!(matches!(err, ClientError::Conflict(_)));

        assert_eq!(client.bucket_attrs("b1").await.unwrap().name, "b1");
        client.delete_bucket("b1").await.unwrap();
        assert!(client.bucket_attrs("b1").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_non_empty_bucket_is_refused() {
        let client = client_with_objects(&["a"]).await;
        let err = client.delete_bucket("b").await.unwrap_err();
        assert!(matches!(err, ClientError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_write_records_digest_and_link() {
        let client = MemoryClient::with_endpoint("http://localhost:4443/");
        client.create_bucket("p", "b1").await.unwrap();
        client
            .write_object("b1", "dir/f1", upload(b"hello"))
            .await
            .unwrap();

        let attrs = client.object_attrs("b1", "dir/f1").await.unwrap();
        assert_eq!(attrs.size, 5);
        assert_eq!(hex::encode(&attrs.md5), "5d41402abc4b2a76b9719d911017c592");
        assert!(
            attrs
                .media_link
                .starts_with("http://localhost:4443/download/storage/v1/b/b1/o/dir%2Ff1?")
        );
    }

    #[tokio::test]
    async fn test_write_to_missing_bucket() {
        let client = MemoryClient::new();
        let err = client.write_object("nope", "a", upload(b"")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_pages_in_order() {
        let client = client_with_objects(&["c", "a", "b", "x/1"]).await;

        let first = client
            .list_objects("b", &ListQuery::new("", &Cursor::start(), 2))
            .await
            .unwrap();
        let names: Vec<_> = first.items.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);

        let cursor = Cursor::from(first.next_cursor);
        let second = client
            .list_objects("b", &ListQuery::new("", &cursor, 2))
            .await
            .unwrap();
        let names: Vec<_> = second.items.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["c", "x/1"]);
        assert!(second.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_list_exact_page_has_no_cursor() {
        let client = client_with_objects(&["a", "b"]).await;
        let page = client
            .list_objects("b", &ListQuery::new("", &Cursor::start(), 2))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_list_prefix_and_default_page_size() {
        let client = client_with_objects(&["logs/1", "logs/2", "data/1"]).await;
        let page = client
            .list_objects("b", &ListQuery::new("logs/", &Cursor::start(), 0))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_list_rejects_garbage_cursor() {
        let client = client_with_objects(&["a"]).await;
        let err = client
            .list_objects("b", &ListQuery::new("", &Cursor::new("!!"), 1))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_list_buckets_by_project() {
        let client = MemoryClient::new();
        client.create_bucket("p", "b2").await.unwrap();
        client.create_bucket("p", "b1").await.unwrap();
        client.create_bucket("other", "b0").await.unwrap();

        let page = client.list_buckets("p", &ListQuery::default()).await.unwrap();
        let names: Vec<_> = page.items.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["b1", "b2"]);
    }

    #[tokio::test]
    async fn test_read_object_chunks() {
        static DATA: [u8; READ_CHUNK_SIZE + 10] = [7; READ_CHUNK_SIZE + 10];

        let client = MemoryClient::new();
        client.create_bucket("p", "b").await.unwrap();
        client
            .write_object("b", "big", upload(&DATA))
            .await
            .unwrap();

        let chunks: Vec<Bytes> = client
            .read_object("b", "big")
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].len(), 10);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let client = MemoryClient::new();
        let clone = client.clone();
        client.create_bucket("p", "b").await.unwrap();
        assert!(clone.bucket_attrs("b").await.is_ok());
    }
}
