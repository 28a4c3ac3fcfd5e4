//! End-to-end engine scenarios against a mock source.

use std::collections::BTreeSet;
use std::sync::mpsc;
use std::sync::Arc;

use proptest::prelude::*;
use weft_engine::{
    merge_delta, spawn, CancellationToken, CollectedBatch, Engine, EngineError, InlineExecutor,
    MockSource, Snapshot,
};
use weft_model::{
    Asset, ContentTypeSchema, DeletedResource, Entry, FieldDef, FieldType, FieldValue, Includes,
    Link, LinkKind, LocaleDef, PageEnvelope, PageRequest, Resource, SpaceMeta,
};

fn space() -> SpaceMeta {
    SpaceMeta::new(
        "space",
        "Demo",
        vec![
            LocaleDef::new("en", "English").as_default(),
            LocaleDef::new("tlh", "Klingon").with_fallback("en"),
        ],
    )
}

fn cat_schema() -> ContentTypeSchema {
    ContentTypeSchema::new("cat", "Cat")
        .with_field(FieldDef::scalar("name", FieldType::Symbol))
        .with_field(FieldDef::link("bestFriend", LinkKind::Entry))
        .with_field(FieldDef::link("image", LinkKind::Asset))
}

fn engine() -> (Arc<MockSource>, Engine<MockSource>) {
    let source = Arc::new(MockSource::new());
    source.set_space(space());
    source.add_content_type(cat_schema());
    (Arc::clone(&source), Engine::new(source))
}

#[test]
fn listing_resolves_links_across_pages() {
    let (source, engine) = engine();
    // "nyan" arrives on page one but its best friend and image only on
    // page two; resolution must still succeed because pruning waits for
    // the full batch.
    source.enqueue_page(
        "entries",
        PageEnvelope::new(vec![Entry::new("nyan", "cat")
            .with_field("bestFriend", "en", Link::to_entry("happy"))
            .with_field("image", "en", Link::to_asset("cover"))
            .into()])
        .with_paging(0, 1, 2),
    );
    source.enqueue_page(
        "entries",
        PageEnvelope::new(vec![Entry::new("happy", "cat").into()])
            .with_includes(Includes {
                assets: vec![Asset::new("cover").with_file(
                    "en",
                    "https://cdn.example/cover.png",
                    "image/png",
                )],
                entries: vec![],
            })
            .with_paging(1, 1, 2),
    );

    let snapshot = engine.fetch_all(&PageRequest::entries()).unwrap();
    assert_eq!(snapshot.len(), 2);

    let nyan = snapshot.entry("nyan").unwrap();
    let friend = snapshot
        .follow(nyan.field("bestFriend").unwrap().as_link().unwrap())
        .unwrap();
    assert_eq!(friend.id(), "happy");

    let image = snapshot
        .follow(nyan.field("image").unwrap().as_link().unwrap())
        .unwrap()
        .as_asset()
        .unwrap();
    assert_eq!(image.url(), Some("https://cdn.example/cover.png"));
}

#[test]
fn initial_sync_then_delta() {
    let (source, engine) = engine();
    source.enqueue_page(
        "sync",
        PageEnvelope::new(vec![
            Entry::new("a", "cat")
                .with_field("name", "en", FieldValue::text("Alpha"))
                .into(),
            Entry::new("b", "cat")
                .with_field("name", "en", FieldValue::text("Beta"))
                .into(),
            Entry::new("c", "cat")
                .with_field("name", "en", FieldValue::text("Gamma"))
                .into(),
        ])
        .with_next_sync_url("https://cdn.example/sync?sync_token=t1"),
    );

    let baseline = engine.sync_initial().unwrap();
    assert_eq!(baseline.len(), 3);
    assert_eq!(baseline.sync_token(), Some("t1"));

    // Delta: update "b", delete "c", create "d". Spread over two pages.
    source.enqueue_page(
        "sync",
        PageEnvelope::new(vec![
            Entry::new("b", "cat")
                .with_field("name", "en", FieldValue::text("Beta v2"))
                .into(),
            DeletedResource::entry("c").into(),
        ])
        .with_next_page_url("https://cdn.example/sync?sync_token=p2"),
    );
    source.enqueue_page(
        "sync",
        PageEnvelope::new(vec![Entry::new("d", "cat")
            .with_field("name", "en", FieldValue::text("Delta"))
            .into()])
        .with_next_sync_url("https://cdn.example/sync?sync_token=t2"),
    );

    let next = engine.sync_next(&baseline).unwrap();

    // Delta items keep their own relative order at the front; the
    // unchanged survivor trails.
    let ids: Vec<&str> = next.items().iter().map(|r| r.id()).collect();
    assert_eq!(ids, ["b", "d", "a"]);
    assert_eq!(
        next.entry("b").unwrap().field("name").unwrap().as_str(),
        Some("Beta v2")
    );
    assert!(next.entry("c").is_none());
    assert!(next.deleted_entries().contains("c"));
    assert_eq!(next.sync_token(), Some("t2"));

    // The baseline snapshot is a distinct, untouched value.
    assert_eq!(baseline.len(), 3);
    assert_eq!(
        baseline.entry("b").unwrap().field("name").unwrap().as_str(),
        Some("Beta")
    );
    assert_eq!(baseline.sync_token(), Some("t1"));
}

#[test]
fn synced_snapshot_switches_locales_without_refetch() {
    let (source, engine) = engine();
    source.enqueue_page(
        "sync",
        PageEnvelope::new(vec![Entry::new("nyan", "cat")
            .with_field("name", "en", FieldValue::text("Nyan"))
            .with_field("name", "tlh", FieldValue::text("vIghro'"))
            .with_field("color", "en", FieldValue::text("rainbow"))
            .into()])
        .with_next_sync_url("https://cdn.example/sync?sync_token=t1"),
    );

    let mut snapshot = engine.sync_initial().unwrap();
    let fetches_after_sync = source.page_fetches();

    snapshot.set_locale("tlh");
    let nyan = snapshot.entry("nyan").unwrap();
    assert_eq!(nyan.field("name").unwrap().as_str(), Some("vIghro'"));
    // No Klingon color: the chain falls back to English.
    assert_eq!(nyan.field("color").unwrap().as_str(), Some("rainbow"));
    assert_eq!(source.page_fetches(), fetches_after_sync);
}

#[test]
fn missing_schema_fails_the_whole_sync() {
    let (source, engine) = engine();
    source.enqueue_page(
        "sync",
        PageEnvelope::new(vec![
            Entry::new("ok", "cat").into(),
            Entry::new("bad", "ghost-type").into(),
        ])
        .with_next_sync_url("https://cdn.example/sync?sync_token=t1"),
    );

    let err = engine.sync_initial().unwrap_err();
    assert!(matches!(
        err,
        EngineError::ContentTypeNotFound { ref content_type_id, .. }
            if content_type_id == "ghost-type"
    ));
}

#[test]
fn background_sync_delivers_unless_cancelled() {
    let (source, eng) = engine();
    source.enqueue_page(
        "sync",
        PageEnvelope::new(vec![Entry::new("nyan", "cat").into()])
            .with_next_sync_url("https://cdn.example/sync?sync_token=t1"),
    );
    let eng = Arc::new(eng);

    let (tx, rx) = mpsc::channel();
    let worker = Arc::clone(&eng);
    let handle = spawn(
        move || worker.sync_initial(),
        Arc::new(InlineExecutor),
        CancellationToken::new(),
        move |result| tx.send(result).unwrap(),
    );
    handle.join().unwrap();

    let snapshot = rx.recv().unwrap().unwrap();
    assert_eq!(snapshot.len(), 1);

    // Same fetch again, but cancelled before delivery.
    source.enqueue_page(
        "sync",
        PageEnvelope::new(vec![Entry::new("nyan", "cat").into()])
            .with_next_sync_url("https://cdn.example/sync?sync_token=t2"),
    );
    let (tx, rx) = mpsc::channel::<weft_engine::EngineResult<Snapshot>>();
    let token = CancellationToken::new();
    token.cancel();
    let worker = Arc::clone(&eng);
    let handle = spawn(
        move || worker.sync_initial(),
        Arc::new(InlineExecutor),
        token,
        move |result| tx.send(result).unwrap(),
    );
    handle.join().unwrap();
    assert!(rx.try_recv().is_err());
}

fn live(id: u8, version: i64) -> Resource {
    Entry::new(format!("e{id}"), "cat")
        .with_field("v", "en", FieldValue::integer(version))
        .into()
}

proptest! {
    // The merged entry-id set must equal
    // (baseline ∪ delta-live) minus delta-deleted, whatever the
    // ordering and duplication inside the delta.
    #[test]
    fn merge_set_identity(
        baseline_ids in proptest::collection::btree_set(0u8..30, 0..12),
        delta_live in proptest::collection::vec(0u8..30, 0..12),
        delta_deleted in proptest::collection::btree_set(0u8..30, 0..12),
    ) {
        let baseline = merge_delta(
            None,
            CollectedBatch {
                items: baseline_ids.iter().map(|id| live(*id, 0)).collect(),
                ..CollectedBatch::default()
            },
        );

        let mut items: Vec<Resource> = delta_live.iter().map(|id| live(*id, 1)).collect();
        items.extend(
            delta_deleted
                .iter()
                .map(|id| DeletedResource::entry(format!("e{id}")).into()),
        );
        let merged = merge_delta(
            Some(&baseline),
            CollectedBatch { items, ..CollectedBatch::default() },
        );

        let mut expected: BTreeSet<String> = baseline_ids
            .iter()
            .chain(delta_live.iter())
            .map(|id| format!("e{id}"))
            .collect();
        for id in &delta_deleted {
            expected.remove(&format!("e{id}"));
        }

        let got: BTreeSet<String> =
            merged.entries().keys().cloned().collect();
        prop_assert_eq!(got, expected);
    }
}
