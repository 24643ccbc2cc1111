//! Index behavior observed through the hooks and views.

use std::collections::HashSet;
use std::sync::Arc;

use trove_core::error::ErrorKind;
use trove_core::types::ActorId;
use trove_entity::version::{LocationDescriptor, VersionMetadata};
use trove_index::Lookup;

use crate::helpers::{TestApp, path};

#[tokio::test]
async fn test_uploaded_file_is_found_by_path() {
    let app = TestApp::new();
    let body = app.upload(ActorId::new(), "/results/run1.csv", "obj-1").await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["created"], true);

    let record = app
        .index
        .find_by_path(app.scope_id, &path("results/run1.csv"))
        .record()
        .expect("record");
    assert_eq!(record.version_count(), 1);
    assert_eq!(record.name(), "run1.csv");
}

#[tokio::test]
async fn test_second_upload_appends() {
    let app = TestApp::new();
    let actor = ActorId::new();
    app.upload(actor, "notes.md", "obj-1").await;
    let body = app.upload(actor, "notes.md", "obj-2").await;
    assert_eq!(body["created"], false);

    let live = app.views.resolve(&app.ctx(), "notes.md", None).unwrap();
    assert_eq!(live.index, 2);
    assert_eq!(live.version.location.object, "obj-2");
}

#[tokio::test]
async fn test_missing_prefix_is_reported() {
    let app = TestApp::new();
    app.upload(ActorId::new(), "a/x.txt", "obj-1").await;

    match app.index.find_by_path(app.scope_id, &path("a/b/c.txt")) {
        Lookup::Missing { at } => assert_eq!(at, path("a/b")),
        Lookup::Found(_) => panic!("a/b/c.txt should not resolve"),
    }
    let err = app.views.resolve(&app.ctx(), "a/b", None).unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_uploads_create_one_record() {
    let app = TestApp::new();
    let scope_id = app.scope_id;
    let mut handles = Vec::new();
    for i in 0..16 {
        let index = Arc::clone(&app.index);
        handles.push(tokio::spawn(async move {
            index
                .record_upload(
                    scope_id,
                    &path("shared/data.bin"),
                    ActorId::new(),
                    LocationDescriptor::new("cloudfiles", format!("obj-{i}")).unwrap(),
                    VersionMetadata::default(),
                )
                .await
                .unwrap()
        }));
    }

    let mut created = 0;
    let mut records = HashSet::new();
    for handle in handles {
        let outcome = handle.await.unwrap();
        if outcome.created {
            created += 1;
        }
        records.insert(outcome.record.id());
    }
    assert_eq!(created, 1);
    assert_eq!(records.len(), 1);

    let record = app.index.record(app.scope_id, &path("shared/data.bin")).unwrap();
    assert_eq!(record.version_count(), 16);
    assert_eq!(app.index.version_count(), 16);
}

#[tokio::test]
async fn test_version_ids_resolve_globally() {
    let app = TestApp::new();
    app.upload(ActorId::new(), "a.txt", "obj-1").await;
    app.upload(ActorId::new(), "b.txt", "obj-2").await;

    let b = app.views.resolve(&app.ctx(), "b.txt", Some("1")).unwrap();
    let (record, index, version) = app.index.find_version(b.version.id).unwrap();
    assert_eq!(record.path(), &path("b.txt"));
    assert_eq!(index, 1);
    assert_eq!(version.location.object, "obj-2");
}
