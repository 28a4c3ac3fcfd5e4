//! Pagination walking: gather every page before anything resolves.

use crate::error::EngineResult;
use crate::source::ContentSource;
use weft_model::{Includes, PageOutcome, PageRequest, Resource};

/// Everything a complete page walk produced.
#[derive(Debug, Clone, Default)]
pub struct CollectedBatch {
    /// All items, in the order the pages returned them.
    pub items: Vec<Resource>,
    /// The union of every page's side-load set.
    pub includes: Includes,
    /// Set when the walk ended because a sync completed; carries the
    /// next delta's token.
    pub next_sync_url: Option<String>,
    /// Number of pages fetched.
    pub pages: usize,
}

/// Repeatedly fetches pages, following the continuation cursor, until
/// the source reports no further page (or a sync completes).
///
/// Items accumulate strictly in cursor order and nothing is resolved
/// here: resolution needs the batch's full id universe, including
/// resources that only appear on a later page.
pub fn collect_all<S: ContentSource>(
    source: &S,
    request: &PageRequest,
) -> EngineResult<CollectedBatch> {
    let mut request = request.clone();
    let mut batch = CollectedBatch::default();
    loop {
        let page = source.fetch_page(&request)?;
        batch.pages += 1;
        let outcome = page.next_cursor();
        batch.items.extend(page.items);
        if let Some(includes) = page.includes {
            batch.includes.extend(includes);
        }
        match outcome {
            PageOutcome::More(cursor) => {
                tracing::trace!(page = batch.pages, "following page cursor");
                request.cursor = Some(cursor);
            }
            PageOutcome::SyncComplete { next_sync_url } => {
                batch.next_sync_url = Some(next_sync_url);
                break;
            }
            PageOutcome::Done => break,
        }
    }
    tracing::debug!(
        pages = batch.pages,
        items = batch.items.len(),
        "page walk complete"
    );
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockSource;
    use weft_model::{Cursor, Entry, PageEnvelope};

    fn entry(id: &str) -> Resource {
        Entry::new(id, "t").into()
    }

    #[test]
    fn classic_paging_accumulates_in_order() {
        let source = MockSource::new();
        source.enqueue_page(
            "entries",
            PageEnvelope::new(vec![entry("a"), entry("b")]).with_paging(0, 2, 5),
        );
        source.enqueue_page(
            "entries",
            PageEnvelope::new(vec![entry("c"), entry("d")]).with_paging(2, 2, 5),
        );
        source.enqueue_page(
            "entries",
            PageEnvelope::new(vec![entry("e")]).with_paging(4, 2, 5),
        );

        let batch = collect_all(&source, &PageRequest::entries()).unwrap();
        assert_eq!(batch.pages, 3);
        let ids: Vec<&str> = batch.items.iter().map(Resource::id).collect();
        assert_eq!(ids, ["a", "b", "c", "d", "e"]);
        assert!(batch.next_sync_url.is_none());
    }

    #[test]
    fn sync_continuation_follows_page_urls_then_stops() {
        let source = MockSource::new();
        source.enqueue_page(
            "sync",
            PageEnvelope::new(vec![entry("a")])
                .with_next_page_url("https://cdn.example/sync?sync_token=p2"),
        );
        source.enqueue_page(
            "sync",
            PageEnvelope::new(vec![entry("b")])
                .with_next_sync_url("https://cdn.example/sync?sync_token=bar"),
        );

        let batch = collect_all(&source, &PageRequest::sync_initial()).unwrap();
        assert_eq!(batch.pages, 2);
        assert_eq!(batch.items.len(), 2);
        assert_eq!(
            batch.next_sync_url.as_deref(),
            Some("https://cdn.example/sync?sync_token=bar")
        );
    }

    #[test]
    fn cursor_is_forwarded_to_the_source() {
        // Record the cursor by asserting the second fetch only happens
        // when the first page demanded it.
        let source = MockSource::new();
        source.enqueue_page(
            "entries",
            PageEnvelope::new(vec![entry("a")]).with_paging(0, 1, 2),
        );
        source.enqueue_page(
            "entries",
            PageEnvelope::new(vec![entry("b")]).with_paging(1, 1, 2),
        );

        let request = PageRequest::entries().with_cursor(Cursor::Offset(0));
        let batch = collect_all(&source, &request).unwrap();
        assert_eq!(batch.pages, 2);
        assert_eq!(source.page_fetches(), 2);
    }

    #[test]
    fn includes_union_across_pages() {
        let source = MockSource::new();
        source.enqueue_page(
            "entries",
            PageEnvelope::new(vec![entry("a")])
                .with_includes(Includes {
                    assets: vec![weft_model::Asset::new("one")],
                    entries: vec![],
                })
                .with_paging(0, 1, 2),
        );
        source.enqueue_page(
            "entries",
            PageEnvelope::new(vec![entry("b")])
                .with_includes(Includes {
                    assets: vec![weft_model::Asset::new("two")],
                    entries: vec![],
                })
                .with_paging(1, 1, 2),
        );

        let batch = collect_all(&source, &PageRequest::entries()).unwrap();
        assert_eq!(batch.includes.assets.len(), 2);
    }

    #[test]
    fn source_failure_propagates() {
        let source = MockSource::new();
        source.enqueue_page(
            "entries",
            PageEnvelope::new(vec![entry("a")]).with_paging(0, 1, 3),
        );
        // Second page missing: the walk surfaces the source error.
        assert!(collect_all(&source, &PageRequest::entries()).is_err());
    }
}
