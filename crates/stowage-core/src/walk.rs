//! Full traversals built on cursor pagination.

use async_stream::try_stream;
use futures::Stream;

use crate::{Container, Cursor, Item, Location, Result, TRACING_TARGET};

/// Streams every item in `container` whose id starts with `prefix`,
/// fetching `page_size` items per request.
///
/// The stream ends after the page whose cursor is empty, or at the first
/// error, which it yields.
pub fn walk_items<'a>(
    container: &'a dyn Container,
    prefix: &'a str,
    page_size: usize,
) -> impl Stream<Item = Result<Box<dyn Item>>> + Send + 'a {
    try_stream! {
        let mut cursor = Cursor::start();
        loop {
            let page = container.items(prefix, &cursor, page_size).await?;

            tracing::trace!(
                target: TRACING_TARGET,
                container = container.id(),
                prefix,
                count = page.len(),
                "Walked item page"
            );

            for item in page.items {
                yield item;
            }

            if page.next.is_empty() {
                break;
            }
            cursor = page.next;
        }
    }
}

/// Streams every container in `location` whose name starts with `prefix`.
pub fn walk_containers<'a>(
    location: &'a dyn Location,
    prefix: &'a str,
    page_size: usize,
) -> impl Stream<Item = Result<Box<dyn Container>>> + Send + 'a {
    try_stream! {
        let mut cursor = Cursor::start();
        loop {
            let page = location.containers(prefix, &cursor, page_size).await?;

            for container in page.items {
                yield container;
            }

            if page.next.is_empty() {
                break;
            }
            cursor = page.next;
        }
    }
}
