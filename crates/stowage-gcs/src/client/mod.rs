//! The storage client boundary.
//!
//! [`StorageClient`] is the set of Cloud Storage calls the location, container
//! and item types are built on. [`MemoryClient`] keeps everything in process;
//! the `reqwest` feature adds [`ReqwestClient`] for the JSON API.

mod error;
mod handle;
mod memory;
#[cfg(feature = "reqwest")]
#[cfg_attr(docsrs, doc(cfg(feature = "reqwest")))]
pub mod reqwest;
mod types;

use stowage_core::ByteStream;

pub use error::{ClientError, ClientResult};
pub(crate) use handle::ClientHandle;
pub use memory::MemoryClient;
#[cfg(feature = "reqwest")]
pub use self::reqwest::ReqwestClient;
pub use types::{BucketAttrs, ListPage, ListQuery, ObjectAttrs, ObjectWrite};

/// Calls against a Cloud Storage account.
///
/// Implementations report missing buckets and objects as
/// [`ClientError::NotFound`]; callers decide how to surface that.
#[async_trait::async_trait]
pub trait StorageClient: Send + Sync + std::fmt::Debug {
    /// Creates a bucket owned by `project_id`.
    async fn create_bucket(&self, project_id: &str, name: &str) -> ClientResult<BucketAttrs>;

    /// Deletes an empty bucket.
    async fn delete_bucket(&self, name: &str) -> ClientResult<()>;

    /// Fetches bucket attributes.
    async fn bucket_attrs(&self, name: &str) -> ClientResult<BucketAttrs>;

    /// Lists buckets owned by `project_id`, in name order.
    async fn list_buckets(
        &self,
        project_id: &str,
        query: &ListQuery,
    ) -> ClientResult<ListPage<BucketAttrs>>;

    /// Fetches object attributes.
    async fn object_attrs(&self, bucket: &str, name: &str) -> ClientResult<ObjectAttrs>;

    /// Lists objects in a bucket, in name order.
    async fn list_objects(
        &self,
        bucket: &str,
        query: &ListQuery,
    ) -> ClientResult<ListPage<ObjectAttrs>>;

    /// Deletes an object.
    async fn delete_object(&self, bucket: &str, name: &str) -> ClientResult<()>;

    /// Uploads an object, replacing any object of the same name.
    ///
    /// The upload is committed only once the content has been read to the
    /// end; a failed write leaves no partial object behind.
    async fn write_object(
        &self,
        bucket: &str,
        name: &str,
        write: ObjectWrite,
    ) -> ClientResult<()>;

    /// Opens a stream over an object's content.
    async fn read_object(&self, bucket: &str, name: &str) -> ClientResult<ByteStream>;
}
