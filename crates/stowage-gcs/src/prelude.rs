//! Convenient re-exports for common use.

pub use crate::client::{MemoryClient, StorageClient};
#[cfg(feature = "reqwest")]
pub use crate::client::ReqwestClient;
pub use crate::{GcsConfig, GcsContainer, GcsItem, GcsLocation, KIND};
