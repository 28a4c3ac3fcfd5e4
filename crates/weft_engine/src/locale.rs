//! Snapshot localization: attaching the space's fallback chain to
//! every resource.

use crate::snapshot::Snapshot;
use std::sync::Arc;
use weft_model::LocaleChain;

/// Attaches the locale chain to every asset and entry in the snapshot
/// and resets each active locale to the space default.
///
/// After this, field reads on any resource walk the fallback chain
/// from the resource's active locale; switching locales later is a
/// per-resource (or snapshot-wide) cursor move, no re-fetch.
pub fn localize(snapshot: &mut Snapshot, chain: &Arc<LocaleChain>) {
    for asset in snapshot.assets.values_mut() {
        asset.attach_locales(Arc::clone(chain));
    }
    for entry in snapshot.entries.values_mut() {
        entry.attach_locales(Arc::clone(chain));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_model::{Asset, Entry, FieldValue, LocaleDef, Resource, SpaceMeta};

    fn chain() -> Arc<LocaleChain> {
        let space = SpaceMeta::new(
            "s",
            "s",
            vec![
                LocaleDef::new("en-US", "English").as_default(),
                LocaleDef::new("tlh", "Klingon").with_fallback("en-US"),
            ],
        );
        Arc::new(LocaleChain::from_space(&space))
    }

    #[test]
    fn every_resource_starts_at_the_default_locale() {
        let items: Vec<Resource> = vec![
            Entry::new("nyan", "cat")
                .with_field("name", "en-US", FieldValue::text("Nyan"))
                .into(),
            Asset::new("cover")
                .with_field("title", "en-US", FieldValue::text("Cover"))
                .into(),
        ];
        let mut snapshot = Snapshot::from_batch(items, None);
        localize(&mut snapshot, &chain());

        let entry = snapshot.entry("nyan").unwrap();
        assert_eq!(entry.locale(), "en-US");
        assert_eq!(entry.field("name").unwrap().as_str(), Some("Nyan"));
        assert_eq!(snapshot.asset("cover").unwrap().locale(), "en-US");
    }

    #[test]
    fn fallback_applies_after_locale_switch() {
        let items: Vec<Resource> = vec![Entry::new("nyan", "cat")
            .with_field("name", "en-US", FieldValue::text("Nyan"))
            .with_field("name", "tlh", FieldValue::text("vIghro'"))
            .with_field("color", "en-US", FieldValue::text("rainbow"))
            .into()];
        let mut snapshot = Snapshot::from_batch(items, None);
        localize(&mut snapshot, &chain());

        snapshot.set_locale("tlh");
        let entry = snapshot.entry("nyan").unwrap();
        assert_eq!(entry.field("name").unwrap().as_str(), Some("vIghro'"));
        assert_eq!(entry.field("color").unwrap().as_str(), Some("rainbow"));
    }
}
