//! The collaborator seam the engine fetches through.

use crate::error::{EngineError, EngineResult};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use weft_model::{ContentTypeSchema, PageEnvelope, PageRequest, SpaceMeta};

/// A content source executes fetches against the remote space.
///
/// This trait abstracts the transport layer (HTTP, recorded fixtures,
/// mock for testing). Implementations own query-string construction,
/// authentication, retries and JSON decoding; the engine calls these
/// operations opaquely and forwards their failures unchanged.
pub trait ContentSource: Send + Sync {
    /// Fetches one page of a listing or sync delta.
    fn fetch_page(&self, request: &PageRequest) -> EngineResult<PageEnvelope>;

    /// Fetches a single content-type schema by id. `Ok(None)` means the
    /// id does not exist remotely.
    fn fetch_content_type(&self, id: &str) -> EngineResult<Option<ContentTypeSchema>>;

    /// Fetches the space metadata (locale list included).
    fn fetch_space(&self) -> EngineResult<SpaceMeta>;
}

/// A mock source for testing: envelopes are queued per request path and
/// handed out in order; fetch counts are observable.
#[derive(Debug, Default)]
pub struct MockSource {
    space: Mutex<Option<SpaceMeta>>,
    content_types: Mutex<HashMap<String, ContentTypeSchema>>,
    pages: Mutex<HashMap<String, VecDeque<PageEnvelope>>>,
    content_type_delay: Mutex<Option<Duration>>,
    page_fetches: AtomicUsize,
    content_type_fetches: AtomicUsize,
    space_fetches: AtomicUsize,
}

impl MockSource {
    /// Creates an empty mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the space metadata to serve.
    pub fn set_space(&self, space: SpaceMeta) {
        *self.space.lock() = Some(space);
    }

    /// Registers a content-type schema.
    pub fn add_content_type(&self, schema: ContentTypeSchema) {
        self.content_types.lock().insert(schema.id.clone(), schema);
    }

    /// Queues a page envelope for a request path.
    pub fn enqueue_page(&self, path: impl Into<String>, page: PageEnvelope) {
        self.pages
            .lock()
            .entry(path.into())
            .or_default()
            .push_back(page);
    }

    /// Makes every content-type fetch sleep first, to widen race
    /// windows in concurrency tests.
    pub fn set_content_type_delay(&self, delay: Duration) {
        *self.content_type_delay.lock() = Some(delay);
    }

    /// Number of page fetches served.
    pub fn page_fetches(&self) -> usize {
        self.page_fetches.load(Ordering::SeqCst)
    }

    /// Number of content-type fetches served.
    pub fn content_type_fetches(&self) -> usize {
        self.content_type_fetches.load(Ordering::SeqCst)
    }

    /// Number of space fetches served.
    pub fn space_fetches(&self) -> usize {
        self.space_fetches.load(Ordering::SeqCst)
    }
}

impl ContentSource for MockSource {
    fn fetch_page(&self, request: &PageRequest) -> EngineResult<PageEnvelope> {
        self.page_fetches.fetch_add(1, Ordering::SeqCst);
        self.pages
            .lock()
            .get_mut(&request.path)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| EngineError::source(format!("no queued page for '{}'", request.path)))
    }

    fn fetch_content_type(&self, id: &str) -> EngineResult<Option<ContentTypeSchema>> {
        let delay = *self.content_type_delay.lock();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        self.content_type_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.content_types.lock().get(id).cloned())
    }

    fn fetch_space(&self) -> EngineResult<SpaceMeta> {
        self.space_fetches.fetch_add(1, Ordering::SeqCst);
        self.space
            .lock()
            .clone()
            .ok_or_else(|| EngineError::source("no space set"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_are_served_in_queue_order() {
        let source = MockSource::new();
        source.enqueue_page("entries", PageEnvelope::new(Vec::new()).with_paging(0, 1, 2));
        source.enqueue_page("entries", PageEnvelope::new(Vec::new()).with_paging(1, 1, 2));

        let request = PageRequest::entries();
        let first = source.fetch_page(&request).unwrap();
        assert_eq!(first.skip, Some(0));
        let second = source.fetch_page(&request).unwrap();
        assert_eq!(second.skip, Some(1));
        assert_eq!(source.page_fetches(), 2);
    }

    #[test]
    fn exhausted_queue_is_a_source_error() {
        let source = MockSource::new();
        let err = source.fetch_page(&PageRequest::assets()).unwrap_err();
        assert!(matches!(err, EngineError::Source { .. }));
    }

    #[test]
    fn unknown_content_type_is_none() {
        let source = MockSource::new();
        assert_eq!(source.fetch_content_type("ghost").unwrap(), None);
        assert_eq!(source.content_type_fetches(), 1);
    }
}
