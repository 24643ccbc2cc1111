//! Folder listings and revision pages.

use trove_core::error::ErrorKind;
use trove_core::types::ActorId;
use trove_entity::tree::EntryKind;

use crate::helpers::{TestApp, path};

#[tokio::test]
async fn test_listing_hides_deleted_and_sorts() {
    let app = TestApp::new();
    let actor = ActorId::new();
    for (file, object) in [("data/zeta.csv", "o1"), ("data/alpha.csv", "o2"), ("data/raw/x.bin", "o3")] {
        app.upload(actor, file, object).await;
    }
    app.index
        .delete_path(app.scope_id, &path("data/zeta.csv"), actor)
        .unwrap();

    let entries = app.tree.list(&app.ctx(), "/data/").unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["alpha.csv", "raw"]);
    assert_eq!(entries[0].kind, EntryKind::File);
    assert_eq!(entries[0].version_count, Some(1));
    assert_eq!(entries[1].kind, EntryKind::Directory);
}

#[tokio::test]
async fn test_listing_errors() {
    let app = TestApp::new();
    assert!(app.tree.list(&app.ctx(), "").unwrap().is_empty());

    app.upload(ActorId::new(), "file.txt", "o1").await;
    let err = app.tree.list(&app.ctx(), "file.txt").unwrap_err();
    assert_eq!(err.kind, ErrorKind::BadRequest);
    let err = app.tree.list(&app.ctx(), "nowhere").unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_revision_pages_newest_first() {
    let app = TestApp::new();
    let actor = ActorId::new();
    for i in 1..=7 {
        app.upload(actor, "log.txt", &format!("obj-{i}")).await;
    }

    let pages: Vec<Vec<usize>> = collect_pages(&app, 3).await;
    assert_eq!(pages, vec![vec![7, 6, 5], vec![4, 3, 2], vec![1]]);

    let first = app.revisions.list_revisions(&app.ctx(), "log.txt", None).await.unwrap();
    assert!(first.more);
    assert!(first.revisions[0].download_url.starts_with("https://files.test/download/cloudfiles/obj-7?"));
    let last = app.revisions.list_revisions(&app.ctx(), "log.txt", Some("2")).await.unwrap();
    assert!(!last.more);
}

async fn collect_pages(app: &TestApp, count: usize) -> Vec<Vec<usize>> {
    let mut pages = Vec::new();
    for page in 0..count {
        let raw = page.to_string();
        let listing = app
            .revisions
            .list_revisions(&app.ctx(), "log.txt", Some(raw.as_str()))
            .await
            .unwrap();
        pages.push(listing.revisions.iter().map(|r| r.index).collect());
    }
    pages
}
