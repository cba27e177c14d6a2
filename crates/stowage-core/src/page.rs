//! Cursor-based pagination.

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Opaque continuation token returned by listing calls.
///
/// The only meaningful operations for callers are "start over" (the empty
/// cursor) and "hand back what the previous page returned". An empty cursor
/// on a returned page means there are no further pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[derive(Display, From, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// The cursor that starts a listing from the beginning.
    pub fn start() -> Self {
        Self::default()
    }

    /// Wraps a backend page token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns `true` for the start cursor, or the end-of-listing marker.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the raw token, or `None` for the empty cursor.
    pub fn token(&self) -> Option<&str> {
        (!self.0.is_empty()).then_some(self.0.as_str())
    }
}

impl AsRef<str> for Cursor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Cursor {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<Option<String>> for Cursor {
    fn from(value: Option<String>) -> Self {
        Self(value.unwrap_or_default())
    }
}

/// One page of a listing together with the cursor for the next one.
#[derive(Debug)]
pub struct Page<T> {
    /// Entries on this page.
    pub items: Vec<T>,
    /// Cursor for the following page; empty when this is the last page.
    pub next: Cursor,
}

impl<T> Page<T> {
    /// Creates a page.
    pub fn new(items: Vec<T>, next: impl Into<Cursor>) -> Self {
        Self {
            items,
            next: next.into(),
        }
    }

    /// Returns `true` if no further pages follow.
    pub fn is_last(&self) -> bool {
        self.next.is_empty()
    }

    /// Number of entries on this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if this page holds no entries.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maps the entries, keeping the cursor.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next: self.next,
        }
    }
}
