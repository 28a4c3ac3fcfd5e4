//! # Weft Engine
//!
//! Client-side engine that maintains a locally resolved, navigable
//! snapshot of a remote, paginated, cross-referencing content graph and
//! brings it up to date through delta synchronization.
//!
//! This crate provides:
//! - The [`ContentSource`] seam the engine fetches through (transport,
//!   auth and JSON decoding live behind it)
//! - Pagination walking: all pages of a listing or delta are gathered,
//!   in cursor order, before anything is resolved
//! - Graph resolution: link stubs are pruned against the batch's id
//!   universe; surviving links are followed through the snapshot,
//!   cycles included
//! - Locale fallback: field reads walk the space's fallback chain from
//!   each resource's active locale
//! - Delta merging: creations, updates and deletions folded into a
//!   baseline snapshot, with per-call deleted-id sets
//! - Off-thread execution with callback delivery and cancellation
//!
//! ## Key invariants
//!
//! - Resolution never runs before the full batch is accumulated
//! - An unresolvable link or an exhausted locale chain is an absent
//!   field, never an error
//! - A missing content-type schema fails the whole batch with a typed
//!   error naming the entry and the missing id
//! - Cancellation suppresses result delivery; it does not interrupt
//!   work already started

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod engine;
mod error;
mod locale;
mod pager;
mod resolver;
mod schema_cache;
mod snapshot;
mod source;
mod sync;
mod task;

pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use locale::localize;
pub use pager::{collect_all, CollectedBatch};
pub use resolver::resolve_snapshot;
pub use schema_cache::ContentTypeCache;
pub use snapshot::{ResourceRef, Snapshot};
pub use source::{ContentSource, MockSource};
pub use sync::merge_delta;
pub use task::{spawn, CallbackExecutor, CancellationToken, InlineExecutor, ThreadExecutor};
