//! # Weft Model
//!
//! Typed record shapes for a remote, paginated, cross-referencing
//! content graph:
//!
//! - Resources: [`Entry`], [`Asset`], [`DeletedResource`] and the
//!   [`Resource`] enum a page's item list is made of
//! - Field values: enum-tagged [`FieldValue`] with [`Link`] stubs
//! - Schemas: [`ContentTypeSchema`] with per-field link declarations
//! - Space metadata: [`SpaceMeta`], [`LocaleDef`] and the derived
//!   [`LocaleChain`] fallback walk
//! - Wire envelopes: [`PageEnvelope`], [`PageRequest`], [`Cursor`]
//!
//! This crate is pure data plus the locale fallback walk; graph
//! resolution, pagination and delta merging live in `weft_engine`.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod envelope;
mod resource;
mod schema;
mod space;
mod value;

pub use envelope::{sync_token_from_url, Cursor, Includes, PageEnvelope, PageOutcome, PageRequest};
pub use resource::{Asset, DeletedResource, Entry, FieldTable, Resource, ResourceKind, SysInfo};
pub use schema::{ContentTypeSchema, FieldDef, FieldType};
pub use space::{LocaleChain, LocaleDef, SpaceMeta};
pub use value::{FieldValue, Link, LinkKind};
