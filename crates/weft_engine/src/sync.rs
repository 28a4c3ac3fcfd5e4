//! Delta merging: folding a gathered sync batch into a baseline
//! snapshot.

use crate::pager::CollectedBatch;
use crate::snapshot::Snapshot;
use std::collections::HashSet;
use weft_model::{LinkKind, Resource};

/// The link-kind class of a resource, counting deletion markers as the
/// kind they delete. `None` for kinds the merge ignores.
fn class_of(resource: &Resource) -> Option<LinkKind> {
    resource.kind().link_kind()
}

/// Merges a gathered sync batch into a baseline snapshot, producing the
/// post-delta snapshot. The baseline is untouched.
///
/// With no baseline (an initial sync) the batch simply materializes.
/// Otherwise the delta's items are folded in newest-first: a live item
/// supersedes any baseline item of the same class and id and takes the
/// front of the item order, a deletion marker removes its target.
/// Because later delta items are applied first and each application
/// removes older versions of the same id, the newest version of every
/// id wins regardless of how many pages mentioned it.
///
/// The deleted-id sets of the result reflect this delta's markers only,
/// not an accumulation across syncs.
pub fn merge_delta(baseline: Option<&Snapshot>, batch: CollectedBatch) -> Snapshot {
    let mut snapshot = match baseline {
        None => Snapshot::from_batch(batch.items, None),
        Some(baseline) => {
            let mut working = baseline.ordered_resources();
            let mut markers = Vec::new();
            let mut seen: HashSet<(LinkKind, String)> = HashSet::new();
            for item in batch.items.into_iter().rev() {
                let Some(class) = class_of(&item) else {
                    continue;
                };
                // Newest mention of an id wins; older mentions in the
                // same delta are ignored outright.
                if !seen.insert((class, item.id().to_owned())) {
                    continue;
                }
                working.retain(|existing| {
                    class_of(existing) != Some(class) || existing.id() != item.id()
                });
                if item.kind().is_deletion() {
                    markers.push(item);
                } else {
                    working.insert(0, item);
                }
            }
            working.extend(markers);
            Snapshot::from_batch(working, None)
        }
    };
    tracing::debug!(
        items = snapshot.len(),
        deleted = snapshot.deleted_assets.len() + snapshot.deleted_entries.len(),
        "delta merged"
    );
    snapshot.next_sync_url = batch.next_sync_url;
    snapshot
}
