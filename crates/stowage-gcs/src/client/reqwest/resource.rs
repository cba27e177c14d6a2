//! JSON API resource representations.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::client::{BucketAttrs, ClientError, ClientResult, ListPage, ObjectAttrs};

/// `storage#bucket` as returned by the service.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct BucketResource {
    pub name: String,
    #[serde(default)]
    pub time_created: Option<Timestamp>,
    #[serde(default)]
    pub location: Option<String>,
}

impl From<BucketResource> for BucketAttrs {
    fn from(resource: BucketResource) -> Self {
        Self {
            name: resource.name,
            created: resource.time_created,
            location: resource.location,
        }
    }
}

/// Request body of `buckets.insert`.
#[derive(Debug, Serialize)]
pub(super) struct NewBucket<'a> {
    pub name: &'a str,
}

/// `storage#object` as returned by the service.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ObjectResource {
    pub bucket: String,
    pub name: String,
    /// Decimal string, as the JSON API encodes 64-bit integers.
    pub size: String,
    #[serde(default)]
    pub md5_hash: Option<String>,
    pub updated: Timestamp,
    pub media_link: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

impl TryFrom<ObjectResource> for ObjectAttrs {
    type Error = ClientError;

    fn try_from(resource: ObjectResource) -> ClientResult<Self> {
        let size = resource.size.parse::<u64>().map_err(|_| {
            ClientError::decode(format!(
                "object '{}' has non-numeric size '{}'",
                resource.name, resource.size
            ))
        })?;

        let md5 = match resource.md5_hash.as_deref() {
            Some(encoded) => STANDARD.decode(encoded).map_err(|_| {
                ClientError::decode(format!("object '{}' has malformed md5Hash", resource.name))
            })?,
            None => Vec::new(),
        };

        Ok(Self {
            bucket: resource.bucket,
            name: resource.name,
            size,
            md5,
            updated: resource.updated,
            media_link: resource.media_link,
            content_type: resource.content_type,
            metadata: resource.metadata.unwrap_or_default(),
        })
    }
}

/// Metadata part of a multipart upload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct NewObject<'a> {
    pub name: &'a str,
    pub md5_hash: String,
    pub metadata: &'a HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<&'a str>,
}

/// Any `*.list` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl ListResponse<BucketResource> {
    pub fn into_page(self) -> ListPage<BucketAttrs> {
        let items = self.items.into_iter().map(BucketAttrs::from).collect();
        ListPage::new(items, non_empty(self.next_page_token))
    }
}

impl ListResponse<ObjectResource> {
    pub fn try_into_page(self) -> ClientResult<ListPage<ObjectAttrs>> {
        let items = self
            .items
            .into_iter()
            .map(ObjectAttrs::try_from)
            .collect::<ClientResult<Vec<_>>>()?;
        Ok(ListPage::new(items, non_empty(self.next_page_token)))
    }
}

fn non_empty(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.is_empty())
}

/// Error envelope returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

impl ErrorResponse {
    /// Extracts the service message from an error body, falling back to the
    /// raw text.
    pub fn message_of(body: &str) -> String {
        match serde_json::from_str::<Self>(body) {
            Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
            _ => body.trim().to_string(),
        }
    }
}

/// Builds a `multipart/related` upload body and returns it with its boundary.
pub(super) fn multipart_body(
    metadata: &[u8],
    content: &[u8],
    md5: &[u8; 16],
) -> (String, Vec<u8>) {
    let boundary = format!("stowage-{}", hex::encode(md5));

    let mut body = Vec::with_capacity(metadata.len() + content.len() + 256);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata);
    body.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    (boundary, body)
}
