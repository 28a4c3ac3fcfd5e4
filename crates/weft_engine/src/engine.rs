//! The engine facade: fetch, sync, and the shared caches behind them.

use crate::error::{EngineError, EngineResult};
use crate::locale::localize;
use crate::pager::collect_all;
use crate::resolver::resolve_snapshot;
use crate::schema_cache::ContentTypeCache;
use crate::snapshot::Snapshot;
use crate::source::ContentSource;
use crate::sync::merge_delta;
use parking_lot::RwLock;
use std::sync::Arc;
use weft_model::{ContentTypeSchema, LocaleChain, PageRequest, ResourceKind, SpaceMeta};

/// The client engine. One per space; cheap to share behind an [`Arc`].
///
/// All remote access goes through the injected source. Space metadata
/// and content-type schemas are fetched lazily and cached until
/// [`Engine::refresh_space`]. Every snapshot an engine hands out is
/// fully gathered, localized and link-resolved.
pub struct Engine<S: ContentSource> {
    source: Arc<S>,
    space: RwLock<Option<Arc<SpaceMeta>>>,
    chain: RwLock<Option<Arc<LocaleChain>>>,
    types: ContentTypeCache,
}

impl<S: ContentSource> Engine<S> {
    /// Creates an engine over a source.
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            space: RwLock::new(None),
            chain: RwLock::new(None),
            types: ContentTypeCache::new(),
        }
    }

    /// The source this engine fetches through.
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// The shared content-type cache.
    pub fn content_types(&self) -> &ContentTypeCache {
        &self.types
    }

    /// Space metadata, fetched on first use and cached.
    pub fn space(&self) -> EngineResult<Arc<SpaceMeta>> {
        if let Some(space) = self.space.read().as_ref() {
            return Ok(Arc::clone(space));
        }
        let fetched = Arc::new(self.source.fetch_space()?);
        let chain = Arc::new(LocaleChain::from_space(&fetched));
        *self.space.write() = Some(Arc::clone(&fetched));
        *self.chain.write() = Some(chain);
        Ok(fetched)
    }

    /// The space's locale fallback chain, derived from [`Engine::space`].
    pub fn locale_chain(&self) -> EngineResult<Arc<LocaleChain>> {
        if let Some(chain) = self.chain.read().as_ref() {
            return Ok(Arc::clone(chain));
        }
        self.space()?;
        Ok(Arc::clone(
            self.chain.read().as_ref().ok_or(EngineError::Source {
                message: "locale chain missing after space fetch".into(),
            })?,
        ))
    }

    /// Discards cached space metadata and schemas, then re-fetches the
    /// space. Used when the space's locales or types changed remotely.
    pub fn refresh_space(&self) -> EngineResult<Arc<SpaceMeta>> {
        tracing::info!("refreshing space metadata");
        *self.space.write() = None;
        *self.chain.write() = None;
        self.types.invalidate();
        self.space()
    }

    /// A single content-type schema, via the cache.
    pub fn content_type(&self, id: &str) -> EngineResult<Arc<ContentTypeSchema>> {
        self.types
            .get(self.source.as_ref(), id)?
            .ok_or_else(|| EngineError::NotFound {
                kind: ResourceKind::ContentType,
                id: id.to_owned(),
            })
    }

    /// Fetches every page of a listing and returns the localized,
    /// link-resolved snapshot.
    pub fn fetch_all(&self, request: &PageRequest) -> EngineResult<Snapshot> {
        let chain = self.locale_chain()?;
        let batch = collect_all(self.source.as_ref(), request)?;
        let mut snapshot = Snapshot::from_batch(batch.items, Some(batch.includes));
        snapshot.next_sync_url = batch.next_sync_url;
        localize(&mut snapshot, &chain);
        resolve_snapshot(&mut snapshot, self.source.as_ref(), &self.types)?;
        Ok(snapshot)
    }

    /// Runs an initial sync: the full space content, plus the token the
    /// first delta will continue from.
    pub fn sync_initial(&self) -> EngineResult<Snapshot> {
        self.sync_with(None, &PageRequest::sync_initial())
    }

    /// Runs a delta sync from a previous snapshot's token and merges
    /// the changes into a new snapshot. The baseline is untouched.
    pub fn sync_next(&self, baseline: &Snapshot) -> EngineResult<Snapshot> {
        let token = baseline.sync_token().ok_or(EngineError::MissingSyncToken)?;
        self.sync_with(Some(baseline), &PageRequest::sync_token(token))
    }

    fn sync_with(
        &self,
        baseline: Option<&Snapshot>,
        request: &PageRequest,
    ) -> EngineResult<Snapshot> {
        let chain = self.locale_chain()?;
        let batch = collect_all(self.source.as_ref(), request)?;
        let mut snapshot = merge_delta(baseline, batch);
        localize(&mut snapshot, &chain);
        resolve_snapshot(&mut snapshot, self.source.as_ref(), &self.types)?;
        Ok(snapshot)
    }
}
