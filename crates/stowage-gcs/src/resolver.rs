//! Item URLs and their resolution back to bucket and object names.
//!
//! Item URLs are the object's media link with the scheme replaced by
//! [`KIND`] and the query dropped:
//!
//! ```text
//! google://storage.googleapis.com/download/storage/v1/b/{bucket}/o/{object}
//! ```
//!
//! Parsing is positional and mirrors the exact shape of the media links the
//! service issues today. If Cloud Storage changes that layout, resolution
//! breaks here and nowhere else.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use stowage_core::{Error, Result};
use url::{Position, Url};

use crate::KIND;

/// Characters escaped in a single path segment of a JSON API URL.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// The path is split into at most this many `/`-separated pieces so object
/// names containing `/` stay whole in the last one.
const MAX_SEGMENTS: usize = 8;

/// Index of the bucket name in `/download/storage/v1/b/{bucket}/o/{object}`.
const BUCKET_SEGMENT: usize = 5;

/// Index of the object name in `/download/storage/v1/b/{bucket}/o/{object}`.
const OBJECT_SEGMENT: usize = 7;

/// Bucket and object named by an item URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRef {
    /// Bucket (container) name.
    pub container: String,
    /// Object (item) name.
    pub item: String,
}

/// Returns `true` if `url` uses this backend's scheme.
pub fn is_gcs_url(url: &Url) -> bool {
    url.scheme() == KIND
}

/// Percent-encodes a bucket or object name for use as one path segment.
pub fn encode_segment(name: &str) -> String {
    utf8_percent_encode(name, SEGMENT).to_string()
}

/// Turns an object's media link into its item URL.
pub(crate) fn item_url(media_link: &str) -> Result<Url> {
    let link = Url::parse(media_link).map_err(|e| {
        Error::backend()
            .with_message(format!("malformed media link '{media_link}'"))
            .with_source(e)
    })?;

    let rebased = format!(
        "{KIND}://{}",
        &link[Position::BeforeHost..Position::AfterPath]
    );
    Url::parse(&rebased).map_err(|e| {
        Error::backend()
            .with_message(format!("cannot rebase media link '{media_link}'"))
            .with_source(e)
    })
}

/// Extracts the bucket and object names from an item URL.
///
/// # Errors
///
/// Returns [`SchemeMismatch`](stowage_core::ErrorKind::SchemeMismatch) for a
/// foreign scheme and [`NotFound`](stowage_core::ErrorKind::NotFound) when the
/// path does not follow the media link layout.
pub fn parse_item_url(url: &Url) -> Result<ItemRef> {
    if !is_gcs_url(url) {
        return Err(Error::scheme_mismatch().with_message(format!(
            "not a valid google storage URL: scheme '{}'",
            url.scheme()
        )));
    }

    let pieces: Vec<&str> = url.path().splitn(MAX_SEGMENTS, '/').collect();
    let segment = |index: usize| -> Result<String> {
        let raw = pieces
            .get(index)
            .filter(|piece| !piece.is_empty())
            .ok_or_else(|| {
                Error::not_found().with_message(format!(
                    "url path '{}' does not name a bucket and object",
                    url.path()
                ))
            })?;

        percent_decode_str(raw)
            .decode_utf8()
            .map(|decoded| decoded.into_owned())
            .map_err(|e| {
                Error::not_found()
                    .with_message(format!("url segment '{raw}' is not valid UTF-8"))
                    .with_source(e)
            })
    };

    Ok(ItemRef {
        container: segment(BUCKET_SEGMENT)?,
        item: segment(OBJECT_SEGMENT)?,
    })
}
