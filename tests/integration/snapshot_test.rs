//! Persisting and restoring the index.

use std::sync::Arc;
use std::time::Duration;

use trove_core::error::ErrorKind;
use trove_core::types::ActorId;
use trove_index::FileIndex;

use crate::helpers::{TestApp, path};

#[tokio::test]
async fn test_persist_and_restore_round_trip() {
    let app = TestApp::new();
    let actor = ActorId::new();
    app.upload(actor, "a/one.txt", "o1").await;
    app.upload(actor, "a/one.txt", "o2").await;
    app.upload(actor, "a/two.txt", "o3").await;
    app.index.delete_path(app.scope_id, &path("a/two.txt"), actor).unwrap();
    app.scopes.freeze(app.scope_id);
    app.scopes.persist().await.unwrap();

    let restored = Arc::new(FileIndex::with_lock_timeout(Duration::from_secs(2)));
    let dir = tempfile::tempdir().unwrap();
    let copy = dir.path().join("index.json");
    tokio::fs::copy(app.scopes.snapshot_path(), &copy).await.unwrap();

    let reopened = TestApp::with_index(restored, dir);
    assert!(reopened.scopes.restore().await.unwrap());
    assert!(reopened.scopes.is_frozen(app.scope_id));

    let ctx = trove_service::RequestContext::anonymous(app.scope_id);
    let live = reopened.views.resolve(&ctx, "a/one.txt", None).unwrap();
    assert_eq!(live.index, 2);
    let err = reopened.views.resolve(&ctx, "a/two.txt", None).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Gone);
    let names: Vec<String> = reopened
        .tree
        .list(&ctx, "a")
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["one.txt".to_string()]);
}

#[tokio::test]
async fn test_restore_without_snapshot() {
    let app = TestApp::new();
    assert!(!app.scopes.restore().await.unwrap());
    assert!(app.scopes.scopes().is_empty());
}
