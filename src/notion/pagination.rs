//! Cursor-driven pagination over the content source.
//!
//! [`CollectionReader`] turns the page-at-a-time API into a single lazy stream.
//! Each call starts a fresh listing from the first page; a stream cannot be
//! resumed part-way through. Any failed page request ends the stream with that
//! error. Retrying is the transport's concern, not the reader's.

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use std::future::{Future, ready};

use super::ContentSource;
use super::model::{Block, Record, ResultsPage};
use crate::core::RosterError;

/// Drive `fetch` from the first page until the source reports no further cursor.
///
/// `fetch` receives `None` for the first page and the previous page's
/// `next_cursor` afterwards. A cursor that repeats the one just requested is
/// reported as [`RosterError::SourceUnavailable`] rather than looping forever.
pub fn paginate<'a, T, F, Fut>(fetch: F) -> BoxStream<'a, Result<T, RosterError>>
where
    T: Send + 'a,
    F: FnMut(Option<String>) -> Fut + Send + 'a,
    Fut: Future<Output = Result<ResultsPage<T>, RosterError>> + Send + 'a,
{
    stream::try_unfold((fetch, Some(None::<String>)), |(mut fetch, state)| async move {
        let Some(cursor) = state else {
            return Ok(None);
        };

        let ResultsPage {
            results,
            next_cursor,
            ..
        } = fetch(cursor.clone()).await?;

        if next_cursor.is_some() && next_cursor == cursor {
            return Err(RosterError::source(
                "paginate",
                format!("cursor {} did not advance", cursor.unwrap_or_default()),
            ));
        }

        Ok(Some((results, (fetch, next_cursor.map(Some)))))
    })
    .map_ok(|page| stream::iter(page.into_iter().map(Ok::<T, RosterError>)))
    .try_flatten()
    .boxed()
}

/// Paginated reads of collections and block children.
#[derive(Clone, Copy)]
pub struct CollectionReader<'a> {
    source: &'a dyn ContentSource,
}

impl<'a> CollectionReader<'a> {
    #[must_use]
    pub const fn new(source: &'a dyn ContentSource) -> Self {
        Self { source }
    }

    /// All structured records of a collection, across every page.
    ///
    /// Records without a properties payload are dropped.
    pub fn records<'s>(&self, collection_id: &'s str) -> BoxStream<'s, Result<Record, RosterError>>
    where
        'a: 's,
    {
        let source: &'s dyn ContentSource = self.source;
        paginate(move |cursor: Option<String>| async move {
            source.query_collection(collection_id, cursor.as_deref()).await
        })
        .try_filter(|record| {
            let keep = record.is_structured();
            if !keep {
                tracing::debug!("Ignoring unstructured record {}", record.id);
            }
            ready(keep)
        })
        .boxed()
    }

    /// All typed child blocks of a page, across every page of the listing.
    pub fn children<'s>(&self, block_id: &'s str) -> BoxStream<'s, Result<Block, RosterError>>
    where
        'a: 's,
    {
        let source: &'s dyn ContentSource = self.source;
        paginate(move |cursor: Option<String>| async move {
            source.list_children(block_id, cursor.as_deref()).await
        })
        .try_filter(|block| ready(block.kind.is_some()))
        .boxed()
    }

    /// Collect [`CollectionReader::records`] into memory.
    pub async fn read_all(&self, collection_id: &str) -> Result<Vec<Record>, RosterError> {
        self.records(collection_id).try_collect().await
    }
}
