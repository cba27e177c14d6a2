//! Shared access to the storage client with per-call timeout and cancellation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use stowage_core::{ByteStream, Error, Result};
use tokio_util::sync::CancellationToken;

use super::{ClientResult, StorageClient};
use crate::TRACING_TARGET;

/// Handle shared by a location and everything obtained from it.
///
/// Every backend call goes through [`ClientHandle::call`], which races it
/// against the cancellation token and the configured timeout.
#[derive(Clone)]
pub(crate) struct ClientHandle {
    client: Arc<dyn StorageClient>,
    timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientHandle")
            .field("client", &self.client)
            .field("timeout", &self.timeout)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl ClientHandle {
    pub fn new(client: Arc<dyn StorageClient>, timeout: Option<Duration>) -> Self {
        Self {
            client,
            timeout,
            cancel: CancellationToken::new(),
        }
    }

    pub fn client(&self) -> &dyn StorageClient {
        self.client.as_ref()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Runs one backend call under the timeout and cancellation token.
    pub async fn call<T, F>(&self, op: &'static str, fut: F) -> Result<T>
    where
        T: Send,
        F: Future<Output = ClientResult<T>> + Send,
    {
        let bounded = async {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        op,
                        timeout_ms = limit.as_millis() as u64,
                        "Backend call timed out"
                    );
                    Error::timeout().with_message(format!("{op} exceeded {limit:?}"))
                }),
                None => Ok(fut.await),
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::debug!(target: TRACING_TARGET, op, "Backend call cancelled");
                Err(Error::cancelled().with_message(format!("{op} cancelled")))
            }
            result = bounded => Ok(result??),
        }
    }

    /// Ends `stream` with a cancellation error once the token fires.
    pub fn guard_stream(&self, op: &'static str, stream: ByteStream) -> ByteStream {
        let cancel = self.cancel.clone();
        let guarded = async_stream::stream! {
            let mut stream = stream;
            loop {
                let next = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    next = stream.next() => Some(next),
                };

                match next {
                    Some(Some(chunk)) => yield chunk,
                    Some(None) => break,
                    None => {
                        yield Err(Error::cancelled().with_message(format!("{op} cancelled")));
                        break;
                    }
                }
            }
        };
        guarded.boxed()
    }
}
