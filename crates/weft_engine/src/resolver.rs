//! Graph resolution: pruning link stubs against the batch's id
//! universe.

use crate::error::EngineResult;
use crate::schema_cache::ContentTypeCache;
use crate::snapshot::Snapshot;
use crate::source::ContentSource;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use weft_model::{ContentTypeSchema, FieldValue, LinkKind};

/// Resolves every reference field in the snapshot.
///
/// For each entry, the content-type schema decides which fields are
/// references; for each such field and each locale, a link whose
/// target is absent from the snapshot is removed (single link) or
/// dropped from the list (list of links). Surviving links are
/// guaranteed followable through the snapshot maps.
///
/// Map membership is fixed before any pruning starts, so resolution is
/// order independent and cycles (A→B→A, A→A) need no special casing.
/// Running this twice is a no-op: surviving links still resolve, and
/// scalars pass through untouched.
///
/// A schema that cannot be fetched fails the whole batch with
/// [`crate::EngineError::ContentTypeNotFound`].
pub fn resolve_snapshot<S: ContentSource>(
    snapshot: &mut Snapshot,
    source: &S,
    cache: &ContentTypeCache,
) -> EngineResult<()> {
    // The id universe, frozen up front. Only field contents change
    // below, never map membership.
    let asset_ids: HashSet<String> = snapshot.assets.keys().cloned().collect();
    let entry_ids: HashSet<String> = snapshot.entries.keys().cloned().collect();

    // Every schema must be known before any entry is rewritten, so a
    // missing one aborts with nothing half-pruned.
    let mut schemas: HashMap<String, Arc<ContentTypeSchema>> = HashMap::new();
    for entry in snapshot.entries.values() {
        let schema = cache.ensure_for_entry(source, &entry.sys)?;
        schemas.insert(schema.id.clone(), schema);
    }

    let present = |kind: LinkKind, id: &str| match kind {
        LinkKind::Asset => asset_ids.contains(id),
        LinkKind::Entry => entry_ids.contains(id),
    };

    for entry in snapshot.entries.values_mut() {
        let Some(schema) = entry
            .content_type_id()
            .and_then(|id| schemas.get(id))
            .cloned()
        else {
            continue;
        };
        let fields = entry.resolved_fields_mut();
        for def in &schema.fields {
            if let Some(target) = def.single_link_target() {
                if let Some(by_locale) = fields.get_mut(&def.id) {
                    by_locale.retain(|_, value| match value.as_link() {
                        Some(link) => present(target, &link.id),
                        None => true,
                    });
                }
            } else if let Some(target) = def.link_list_target() {
                if let Some(by_locale) = fields.get_mut(&def.id) {
                    for value in by_locale.values_mut() {
                        if let FieldValue::List(elements) = value {
                            elements.retain(|element| {
                                element
                                    .as_link()
                                    .is_some_and(|link| present(target, &link.id))
                            });
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
