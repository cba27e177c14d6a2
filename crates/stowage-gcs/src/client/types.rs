//! Request and response shapes exchanged with a [`StorageClient`].
//!
//! [`StorageClient`]: super::StorageClient

use std::collections::HashMap;
use std::fmt;

use jiff::Timestamp;
use stowage_core::{ContentReader, Cursor};

/// Upper bound on the buffer reserved up front for an upload.
const MAX_UPLOAD_PREALLOC: u64 = 8 * 1024 * 1024;

/// Bucket attributes as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketAttrs {
    /// Bucket name.
    pub name: String,
    /// Creation time, when reported.
    pub created: Option<Timestamp>,
    /// Location constraint, when reported.
    pub location: Option<String>,
}

/// Object attributes as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectAttrs {
    /// Bucket holding the object.
    pub bucket: String,
    /// Object name.
    pub name: String,
    /// Stored content length in bytes.
    pub size: u64,
    /// Raw MD5 digest of the stored content.
    pub md5: Vec<u8>,
    /// Time of the last update.
    pub updated: Timestamp,
    /// Direct download link for the content.
    pub media_link: String,
    /// Content type, when known.
    pub content_type: Option<String>,
    /// User metadata.
    pub metadata: HashMap<String, String>,
}

/// Parameters of a single list request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Only names starting with this prefix.
    pub prefix: Option<String>,
    /// Continuation token from the previous page.
    pub cursor: Option<String>,
    /// Page size; zero leaves it to the client.
    pub page_size: usize,
}

impl ListQuery {
    /// Builds a query from abstraction-level paging arguments.
    pub fn new(prefix: &str, cursor: &Cursor, page_size: usize) -> Self {
        Self {
            prefix: (!prefix.is_empty()).then(|| prefix.to_string()),
            cursor: cursor.token().map(String::from),
            page_size,
        }
    }
}

/// One page of a list response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPage<T> {
    /// Entries in this page, in service order.
    pub items: Vec<T>,
    /// Token for the following page; `None` on the last one.
    pub next_cursor: Option<String>,
}

impl<T> ListPage<T> {
    /// Creates a page.
    pub fn new(items: Vec<T>, next_cursor: Option<String>) -> Self {
        Self { items, next_cursor }
    }
}

/// An object upload.
pub struct ObjectWrite {
    /// Content to upload, read to the end.
    pub content: ContentReader,
    /// Length the caller declared, if any.
    pub size_hint: Option<u64>,
    /// User metadata to store with the object.
    pub metadata: HashMap<String, String>,
    /// Content type; the service default applies when unset.
    pub content_type: Option<String>,
}

impl ObjectWrite {
    /// Creates an upload with no metadata.
    pub fn new(content: ContentReader) -> Self {
        Self {
            content,
            size_hint: None,
            metadata: HashMap::new(),
            content_type: None,
        }
    }

    /// Sets the declared content length.
    #[must_use]
    pub fn with_size_hint(mut self, size: u64) -> Self {
        self.size_hint = Some(size);
        self
    }

    /// Buffer capacity to reserve before reading the content.
    ///
    /// The declared length is only a hint and may be far off.
    pub(crate) fn prealloc(&self) -> usize {
        self.size_hint.map_or(0, |size| size.min(MAX_UPLOAD_PREALLOC) as usize)
    }

    /// Sets the user metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Sets the content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

impl fmt::Debug for ObjectWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectWrite")
            .field("size_hint", &self.size_hint)
            .field("metadata", &self.metadata)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}
