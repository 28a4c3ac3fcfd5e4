//! The materialized snapshot: an owning arena of resources plus the
//! id maps links are followed through.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use weft_model::{
    sync_token_from_url, Asset, Entry, Includes, Link, LinkKind, Resource, ResourceKind,
};

/// A resolved (or about-to-be-resolved) result set.
///
/// The snapshot owns the only copy of every resource; reference fields
/// stay as [`Link`] values and are followed with [`Snapshot::follow`],
/// so two reads of the same target observe the same object, cycles
/// included.
///
/// Snapshots are plain data once handed to the caller, except for the
/// active-locale cursors, which may be switched at any time without
/// re-fetching. Serialization is supported for opaque persistence; the
/// locale chain must be re-attached after deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub(crate) order: Vec<Link>,
    pub(crate) assets: HashMap<String, Asset>,
    pub(crate) entries: HashMap<String, Entry>,
    pub(crate) deleted_assets: HashSet<String>,
    pub(crate) deleted_entries: HashSet<String>,
    pub(crate) next_sync_url: Option<String>,
}

/// A borrowed view of one live resource in a snapshot.
#[derive(Debug, Clone, Copy)]
pub enum ResourceRef<'a> {
    /// A live asset.
    Asset(&'a Asset),
    /// A live entry.
    Entry(&'a Entry),
}

impl<'a> ResourceRef<'a> {
    /// Resource id.
    pub fn id(&self) -> &'a str {
        match self {
            ResourceRef::Asset(asset) => asset.id(),
            ResourceRef::Entry(entry) => entry.id(),
        }
    }

    /// Resource kind.
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceRef::Asset(_) => ResourceKind::Asset,
            ResourceRef::Entry(_) => ResourceKind::Entry,
        }
    }

    /// The entry, if this is one.
    pub fn as_entry(&self) -> Option<&'a Entry> {
        match self {
            ResourceRef::Entry(entry) => Some(entry),
            ResourceRef::Asset(_) => None,
        }
    }

    /// The asset, if this is one.
    pub fn as_asset(&self) -> Option<&'a Asset> {
        match self {
            ResourceRef::Asset(asset) => Some(asset),
            ResourceRef::Entry(_) => None,
        }
    }
}

impl Snapshot {
    /// Builds a snapshot from a gathered batch.
    ///
    /// Live assets and entries land in the id maps (side-loaded
    /// includes too, though only primary items keep a position in the
    /// ordered item list). Deletion markers are excluded from the maps
    /// and recorded in the deleted-id sets. Unmodeled kinds are
    /// skipped.
    pub fn from_batch(items: Vec<Resource>, includes: Option<Includes>) -> Self {
        let mut snapshot = Self::default();
        for item in items {
            match item {
                Resource::Asset(asset) => {
                    if !snapshot.assets.contains_key(asset.id()) {
                        snapshot.order.push(Link::to_asset(asset.id()));
                    }
                    snapshot.assets.insert(asset.id().to_owned(), asset);
                }
                Resource::Entry(entry) => {
                    if !snapshot.entries.contains_key(entry.id()) {
                        snapshot.order.push(Link::to_entry(entry.id()));
                    }
                    snapshot.entries.insert(entry.id().to_owned(), entry);
                }
                Resource::Deleted(marker) => match marker.sys.kind {
                    ResourceKind::DeletedAsset => {
                        snapshot.deleted_assets.insert(marker.sys.id);
                    }
                    _ => {
                        snapshot.deleted_entries.insert(marker.sys.id);
                    }
                },
                Resource::Other(_) => {}
            }
        }
        if let Some(includes) = includes {
            for asset in includes.assets {
                snapshot.assets.entry(asset.id().to_owned()).or_insert(asset);
            }
            for entry in includes.entries {
                snapshot.entries.entry(entry.id().to_owned()).or_insert(entry);
            }
        }
        snapshot
    }

    /// The primary items, in the order the snapshot holds them.
    pub fn items(&self) -> Vec<ResourceRef<'_>> {
        self.order.iter().filter_map(|link| self.follow(link)).collect()
    }

    /// The primary items as owned resources, in order. Used when a
    /// snapshot serves as the baseline of a merge.
    pub(crate) fn ordered_resources(&self) -> Vec<Resource> {
        self.order
            .iter()
            .filter_map(|link| match link.kind {
                LinkKind::Asset => self.assets.get(&link.id).cloned().map(Resource::Asset),
                LinkKind::Entry => self.entries.get(&link.id).cloned().map(Resource::Entry),
            })
            .collect()
    }

    /// All live assets by id (side-loaded includes included).
    pub fn assets(&self) -> &HashMap<String, Asset> {
        &self.assets
    }

    /// All live entries by id (side-loaded includes included).
    pub fn entries(&self) -> &HashMap<String, Entry> {
        &self.entries
    }

    /// Looks up a live asset.
    pub fn asset(&self, id: &str) -> Option<&Asset> {
        self.assets.get(id)
    }

    /// Looks up a live entry.
    pub fn entry(&self, id: &str) -> Option<&Entry> {
        self.entries.get(id)
    }

    /// Mutable asset access (for per-resource locale switching).
    pub fn asset_mut(&mut self, id: &str) -> Option<&mut Asset> {
        self.assets.get_mut(id)
    }

    /// Mutable entry access (for per-resource locale switching).
    pub fn entry_mut(&mut self, id: &str) -> Option<&mut Entry> {
        self.entries.get_mut(id)
    }

    /// Follows a link to its target. `None` only for links that never
    /// went through resolution (the resolver prunes unresolvable ones).
    pub fn follow(&self, link: &Link) -> Option<ResourceRef<'_>> {
        match link.kind {
            LinkKind::Asset => self.assets.get(&link.id).map(ResourceRef::Asset),
            LinkKind::Entry => self.entries.get(&link.id).map(ResourceRef::Entry),
        }
    }

    /// Ids of assets deleted by the delta this snapshot came from.
    /// Scoped to that one call, not cumulative across syncs.
    pub fn deleted_assets(&self) -> &HashSet<String> {
        &self.deleted_assets
    }

    /// Ids of entries deleted by the delta this snapshot came from.
    pub fn deleted_entries(&self) -> &HashSet<String> {
        &self.deleted_entries
    }

    /// Non-`None` once a sync completed; carries the next delta's token.
    /// Snapshots are only built from fully walked batches, so there is
    /// no mid-sync state to expose here; intermediate page urls are
    /// consumed by the pagination walk.
    pub fn next_sync_url(&self) -> Option<&str> {
        self.next_sync_url.as_deref()
    }

    /// The continuation token for the next delta, extracted from
    /// [`Snapshot::next_sync_url`].
    pub fn sync_token(&self) -> Option<&str> {
        self.next_sync_url().and_then(sync_token_from_url)
    }

    /// Switches the active locale of every resource. O(1) per
    /// resource, never re-fetches.
    pub fn set_locale(&mut self, locale: &str) {
        for asset in self.assets.values_mut() {
            asset.set_locale(locale);
        }
        for entry in self.entries.values_mut() {
            entry.set_locale(locale);
        }
    }

    /// Number of primary items.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the snapshot holds no primary items.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
