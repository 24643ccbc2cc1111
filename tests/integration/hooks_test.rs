//! Storage worker hook flows.

use serde_json::json;

use trove_core::error::ErrorKind;
use trove_core::types::ActorId;

use crate::helpers::{TestApp, path, upload_payload};

#[tokio::test]
async fn test_upload_confirm_and_locate() {
    let app = TestApp::new();
    let actor = ActorId::new();
    let body = app.upload(actor, "raw/scan.tif", "obj-9").await;
    let version_id = body["version_id"].as_str().unwrap().to_string();

    let confirmed = app
        .hooks
        .confirm(json!({
            "version_id": version_id,
            "metadata": {"size": 2048, "contentType": "image/tiff"},
        }))
        .unwrap();
    assert_eq!(confirmed.size(), Some(2048));
    assert!(confirmed.confirmed_at.is_some());

    let location = app
        .hooks
        .locate(&app.ctx(), json!({"path": "raw/scan.tif"}), None)
        .await
        .unwrap();
    assert_eq!(location.path, "obj-9");
    assert_eq!(location.settings["resource"], "bucket-7");
}

#[tokio::test]
async fn test_confirm_twice_conflicts() {
    let app = TestApp::new();
    let body = app.upload(ActorId::new(), "x.txt", "obj-1").await;
    let payload = json!({"version_id": body["version_id"], "metadata": {"size": 1}});

    app.hooks.confirm(payload.clone()).unwrap();
    let err = app.hooks.confirm(payload).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_confirm_unknown_version_is_bad_request() {
    let app = TestApp::new();
    let err = app
        .hooks
        .confirm(json!({
            "version_id": "00000000-0000-0000-0000-000000000001",
            "metadata": {},
        }))
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BadRequest);
}

#[tokio::test]
async fn test_upload_without_actor_is_rejected() {
    let app = TestApp::new();
    let mut payload = upload_payload(ActorId::new(), "x.txt", "obj-1");
    payload["auth"] = json!({});
    let err = app.hooks.upload(&app.ctx(), payload).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::BadRequest);
    assert!(app.index.record(app.scope_id, &path("x.txt")).is_err());
}

#[tokio::test]
async fn test_delete_hook_then_reads_are_gone() {
    let app = TestApp::new();
    let actor = ActorId::new();
    app.upload(actor, "old/draft.docx", "obj-1").await;

    app.hooks
        .delete(
            &app.actor_ctx(actor),
            json!({"path": "old/draft.docx", "auth": {"id": actor.to_string()}}),
        )
        .unwrap();

    let err = app
        .hooks
        .locate(&app.ctx(), json!({"path": "old/draft.docx"}), Some("7"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Gone);

    let err = app
        .hooks
        .delete(
            &app.actor_ctx(actor),
            json!({"path": "old/draft.docx", "auth": {"id": actor.to_string()}}),
        )
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::DeleteRejected);
}

#[tokio::test]
async fn test_delete_hook_error_order() {
    let app = TestApp::new();
    let actor = ActorId::new();
    app.upload(actor, "kept.txt", "obj-1").await;

    let err = app
        .hooks
        .delete(&app.actor_ctx(actor), json!({"path": "absent.txt", "auth": {}}))
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = app
        .hooks
        .delete(&app.actor_ctx(actor), json!({"path": "kept.txt"}))
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BadRequest);
}

#[tokio::test]
async fn test_frozen_scope_refuses_delete() {
    let app = TestApp::new();
    let actor = ActorId::new();
    app.upload(actor, "paper.pdf", "obj-1").await;
    app.scopes.freeze(app.scope_id);

    let err = app
        .hooks
        .delete(
            &app.actor_ctx(actor),
            json!({"path": "paper.pdf", "auth": {"id": actor.to_string()}}),
        )
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::DeleteRejected);
    assert!(!app.index.record(app.scope_id, &path("paper.pdf")).unwrap().is_deleted());
}

#[tokio::test]
async fn test_upload_after_delete_starts_new_history() {
    let app = TestApp::new();
    let actor = ActorId::new();
    app.upload(actor, "cycle.txt", "obj-1").await;
    app.upload(actor, "cycle.txt", "obj-2").await;
    app.index
        .delete_path(app.scope_id, &path("cycle.txt"), actor)
        .unwrap();

    let body = app.upload(actor, "cycle.txt", "obj-3").await;
    assert_eq!(body["created"], true);
    let live = app.views.resolve(&app.ctx(), "cycle.txt", None).unwrap();
    assert_eq!(live.index, 1);
    assert_eq!(live.version.location.object, "obj-3");
}
