//! Memoized content-type schema lookup.

use crate::error::{EngineError, EngineResult};
use crate::source::ContentSource;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use weft_model::{ContentTypeSchema, SysInfo};

/// A shared, lazily populated content-type cache.
///
/// Hits are served from a read-mostly map with no I/O. A miss fetches
/// through the source synchronously; concurrent misses on the same id
/// are funneled through a per-key in-flight guard so only one fetch is
/// issued. Entries live until [`ContentTypeCache::invalidate`]. There
/// is no hidden global state; the cache is passed into resolution
/// explicitly.
#[derive(Debug, Default)]
pub struct ContentTypeCache {
    types: RwLock<HashMap<String, Arc<ContentTypeSchema>>>,
    inflight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ContentTypeCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a schema, fetching and memoizing on miss. `Ok(None)`
    /// means the id does not exist remotely (not memoized; a later
    /// call will ask again).
    pub fn get<S: ContentSource>(
        &self,
        source: &S,
        id: &str,
    ) -> EngineResult<Option<Arc<ContentTypeSchema>>> {
        if let Some(schema) = self.types.read().get(id) {
            return Ok(Some(Arc::clone(schema)));
        }

        let slot = Arc::clone(
            self.inflight
                .lock()
                .entry(id.to_owned())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        );
        let _guard = slot.lock();

        // Another fetch may have landed while we waited on the guard.
        if let Some(schema) = self.types.read().get(id) {
            return Ok(Some(Arc::clone(schema)));
        }

        tracing::debug!(content_type = id, "content-type cache miss");
        let fetched = match source.fetch_content_type(id) {
            Ok(fetched) => fetched,
            Err(err) => {
                self.inflight.lock().remove(id);
                return Err(err);
            }
        };
        let result = fetched.map(|schema| {
            let schema = Arc::new(schema);
            self.types
                .write()
                .insert(id.to_owned(), Arc::clone(&schema));
            schema
        });
        self.inflight.lock().remove(id);
        Ok(result)
    }

    /// Like [`ContentTypeCache::get`], but in the context of resolving
    /// an entry: a missing schema becomes the typed error naming the
    /// entry and the content-type id it declared.
    pub fn ensure_for_entry<S: ContentSource>(
        &self,
        source: &S,
        entry_sys: &SysInfo,
    ) -> EngineResult<Arc<ContentTypeSchema>> {
        let content_type_id = entry_sys.content_type.clone().unwrap_or_default();
        match self.get(source, &content_type_id)? {
            Some(schema) => Ok(schema),
            None => Err(EngineError::ContentTypeNotFound {
                entry_id: entry_sys.id.clone(),
                entry_kind: entry_sys.kind,
                content_type_id,
            }),
        }
    }

    /// Inserts a schema directly, bypassing the source.
    pub fn prime(&self, schema: ContentTypeSchema) {
        self.types
            .write()
            .insert(schema.id.clone(), Arc::new(schema));
    }

    /// Drops every cached schema.
    pub fn invalidate(&self) {
        self.types.write().clear();
        self.inflight.lock().clear();
    }

    /// Number of cached schemas.
    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }

    #[cfg(test)]
    fn inflight_len(&self) -> usize {
        self.inflight.lock().len()
    }
}
