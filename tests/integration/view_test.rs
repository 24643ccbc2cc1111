//! Download, render and view flows.

use trove_core::error::ErrorKind;
use trove_core::traits::render::RenderCacheGateway;
use trove_core::types::{ActorId, RenderOutcome};
use trove_service::DownloadMode;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_version_resolution() {
    let app = TestApp::new();
    let actor = ActorId::new();
    for object in ["v1", "v2", "v3"] {
        app.upload(actor, "model.py", object).await;
    }
    let ctx = app.ctx();

    assert_eq!(app.views.resolve(&ctx, "model.py", None).unwrap().index, 3);
    assert_eq!(
        app.views.resolve(&ctx, "model.py", Some("2")).unwrap().version.location.object,
        "v2"
    );
    for (specifier, kind) in [
        ("0", ErrorKind::InvalidVersionSpecifier),
        ("-1", ErrorKind::InvalidVersionSpecifier),
        ("two", ErrorKind::InvalidVersionSpecifier),
        ("4", ErrorKind::VersionNotFound),
    ] {
        let err = app.views.resolve(&ctx, "model.py", Some(specifier)).unwrap_err();
        assert_eq!(err.kind, kind, "specifier {specifier:?}");
    }
}

#[tokio::test]
async fn test_downloads_are_counted_per_version() {
    let app = TestApp::new();
    let actor = ActorId::new();
    app.upload(actor, "paper.pdf", "p1").await;
    app.upload(actor, "paper.pdf", "p2").await;
    let ctx = app.ctx();

    let ticket = app
        .views
        .download(&ctx, "paper.pdf", Some("1"), DownloadMode::Download)
        .await
        .unwrap();
    assert!(ticket.url.contains("version=1"));
    app.views
        .download(&ctx, "paper.pdf", None, DownloadMode::from_query(Some("render")))
        .await
        .unwrap();

    assert_eq!(app.views.download_count(app.scope_id, "paper.pdf", None).await.unwrap(), 1);
    assert_eq!(app.views.download_count(app.scope_id, "paper.pdf", Some(1)).await.unwrap(), 1);
    assert_eq!(app.views.download_count(app.scope_id, "paper.pdf", Some(2)).await.unwrap(), 0);
}

#[tokio::test]
async fn test_view_queues_one_render_job() {
    let mut app = TestApp::new();
    app.upload(ActorId::new(), "docs/readme.md", "r1").await;
    let ctx = app.ctx();

    let first = app.views.view(&ctx, "docs/readme.md", None).await.unwrap();
    let second = app.views.view(&ctx, "docs/readme.md", None).await.unwrap();
    assert_eq!(first.rendered, RenderOutcome::Pending);
    assert_eq!(second.rendered, RenderOutcome::Pending);
    assert_eq!(first.file_path, "/docs/readme.md");

    let job = app.jobs.recv().await.unwrap();
    assert!(app.jobs.try_recv().is_err());
    app.gateway.store_rendered(&job.cache_key, "<h1>Readme</h1>").await.unwrap();

    let third = app.views.view(&ctx, "docs/readme.md", None).await.unwrap();
    assert_eq!(third.rendered.html(), Some("<h1>Readme</h1>"));
}

#[tokio::test]
async fn test_deleted_file_views_are_gone() {
    let app = TestApp::new();
    let actor = ActorId::new();
    app.upload(actor, "gone.txt", "g1").await;
    app.index
        .delete_path(app.scope_id, &crate::helpers::path("gone.txt"), actor)
        .unwrap();

    let err = app.views.view(&app.ctx(), "gone.txt", None).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Gone);
    let err = app
        .views
        .download(&app.ctx(), "gone.txt", Some("x"), DownloadMode::Download)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Gone);
}
