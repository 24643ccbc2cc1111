//! Conversion between the live index and its persisted shape.

use std::path::Path;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use tracing::info;

use trove_core::error::{AppError, ErrorKind};
use trove_core::result::AppResult;
use trove_core::types::ScopeId;
use trove_entity::path::NormalizedPath;
use trove_entity::tree::snapshot::SNAPSHOT_FORMAT;
use trove_entity::tree::{IndexSnapshot, NodeSnapshot, RecordSnapshot, ScopeSnapshot};

use crate::index::FileIndex;
use crate::node::{DirectoryNode, TreeNode};
use crate::record::FileRecord;
use crate::tree::FileTree;

fn malformed(message: impl Into<String>) -> AppError {
    AppError::new(ErrorKind::Serialization, message)
}

fn export_directory(dir: &DirectoryNode) -> Vec<NodeSnapshot> {
    let mut children: Vec<NodeSnapshot> = dir
        .children()
        .into_iter()
        .map(|child| match child {
            TreeNode::Directory(sub) => NodeSnapshot::Directory {
                name: sub.name().to_string(),
                children: export_directory(&sub),
            },
            TreeNode::File(record) => NodeSnapshot::File(record.snapshot()),
        })
        .collect();
    children.sort_by(|a, b| a.name().cmp(b.name()));
    children
}

impl FileIndex {
    /// Persisted form of one scope. `NotFound` if the scope has no tree.
    pub fn export_scope(&self, scope_id: ScopeId) -> AppResult<ScopeSnapshot> {
        let tree = self
            .scope(scope_id)
            .ok_or_else(|| AppError::not_found(format!("Scope {scope_id} not found")))?;
        Ok(ScopeSnapshot {
            scope_id,
            frozen: tree.is_frozen(),
            children: export_directory(tree.root()),
            retired: tree.retired().iter().map(|record| record.snapshot()).collect(),
        })
    }

    /// Persisted form of every scope.
    pub fn export(&self) -> IndexSnapshot {
        let scopes = self
            .scope_ids()
            .into_iter()
            .filter_map(|scope_id| self.export_scope(scope_id).ok())
            .collect();
        IndexSnapshot::new(scopes)
    }

    /// Rebuild one scope from its persisted form.
    ///
    /// The scope must not already exist, including one opened concurrently
    /// by an upload. Nothing becomes visible unless the whole snapshot is
    /// valid.
    pub fn import_scope(&self, snapshot: ScopeSnapshot) -> AppResult<()> {
        let scope_id = snapshot.scope_id;
        if self.scopes.contains_key(&scope_id) {
            return Err(AppError::conflict(format!("Scope {scope_id} already loaded")));
        }

        let tree = FileTree::new(scope_id);
        let mut records = Vec::new();
        import_nodes(&tree, &NormalizedPath::root(), snapshot.children, &mut records)?;

        let mut retired = Vec::with_capacity(snapshot.retired.len());
        for record in snapshot.retired {
            if !record.is_deleted {
                return Err(malformed(format!(
                    "Retired record {} at '{}' is not deleted",
                    record.id, record.path
                )));
            }
            retired.push(Arc::new(FileRecord::from_snapshot(scope_id, record)));
        }

        let mut seen = std::collections::HashSet::new();
        for record in records.iter().chain(retired.iter()) {
            for version in record.versions() {
                if !seen.insert(version.id) || self.versions.contains_key(&version.id) {
                    return Err(malformed(format!("Duplicate version id {}", version.id)));
                }
            }
        }

        let vacant = match self.scopes.entry(scope_id) {
            Entry::Occupied(_) => {
                return Err(AppError::conflict(format!("Scope {scope_id} already loaded")));
            }
            Entry::Vacant(vacant) => vacant,
        };
        for record in records.iter().chain(retired.iter()) {
            for version in record.versions() {
                self.versions.insert(version.id, Arc::clone(record));
            }
        }
        for record in retired {
            tree.retire(record);
        }
        tree.set_frozen(snapshot.frozen);
        vacant.insert(Arc::new(tree));

        info!(scope_id = %scope_id, records = records.len(), "Scope imported");
        Ok(())
    }

    /// Load every scope of a whole-index snapshot.
    pub fn import(&self, snapshot: IndexSnapshot) -> AppResult<()> {
        if snapshot.format != SNAPSHOT_FORMAT {
            return Err(malformed(format!(
                "Unsupported snapshot format {}",
                snapshot.format
            )));
        }
        for scope in snapshot.scopes {
            self.import_scope(scope)?;
        }
        Ok(())
    }

    /// Write the whole index to a JSON file, creating parent directories.
    pub async fn save_snapshot(&self, path: impl AsRef<Path>) -> AppResult<()> {
        let path = path.as_ref();
        let snapshot = self.export();
        let body = serde_json::to_vec_pretty(&snapshot)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, body).await?;
        info!(path = %path.display(), scopes = snapshot.scopes.len(), "Snapshot saved");
        Ok(())
    }

    /// Load a JSON snapshot file into this index.
    pub async fn load_snapshot(&self, path: impl AsRef<Path>) -> AppResult<()> {
        let path = path.as_ref();
        let body = tokio::fs::read(path).await?;
        let snapshot: IndexSnapshot = serde_json::from_slice(&body)?;
        let scopes = snapshot.scopes.len();
        self.import(snapshot)?;
        info!(path = %path.display(), scopes, "Snapshot loaded");
        Ok(())
    }
}

fn import_nodes(
    tree: &FileTree,
    parent: &NormalizedPath,
    nodes: Vec<NodeSnapshot>,
    records: &mut Vec<Arc<FileRecord>>,
) -> AppResult<()> {
    for node in nodes {
        match node {
            NodeSnapshot::Directory { name, children } => {
                let dir_path = parent.join(&name).map_err(|e| malformed(e.message))?;
                tree.ensure_directories(&dir_path)?;
                import_nodes(tree, &dir_path, children, records)?;
            }
            NodeSnapshot::File(record) => {
                check_position(parent, &record)?;
                let record = Arc::new(FileRecord::from_snapshot(tree.scope_id(), record));
                tree.attach(Arc::clone(&record))?;
                records.push(record);
            }
        }
    }
    Ok(())
}

fn check_position(parent: &NormalizedPath, record: &RecordSnapshot) -> AppResult<()> {
    if record.path.is_root() || record.path.parent() != *parent {
        return Err(malformed(format!(
            "Record '{}' is not located under '{}'",
            record.path, parent
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use trove_core::types::ActorId;
    use trove_entity::version::{LocationDescriptor, VersionMetadata};

    fn path(raw: &str) -> NormalizedPath {
        NormalizedPath::parse(raw).unwrap()
    }

    async fn populated() -> (FileIndex, ScopeId) {
        let index = FileIndex::with_lock_timeout(Duration::from_secs(1));
        let scope = ScopeId::new();
        let actor = ActorId::new();
        for (raw, object) in [("a/one.txt", "o1"), ("a/b/two.txt", "o2"), ("a/one.txt", "o3")] {
            index
                .record_upload(
                    scope,
                    &path(raw),
                    actor,
                    LocationDescriptor::new("cloudfiles", object).unwrap(),
                    VersionMetadata::default(),
                )
                .await
                .unwrap();
        }
        index.delete_path(scope, &path("a/b/two.txt"), actor).unwrap();
        (index, scope)
    }

    #[tokio::test]
    async fn test_export_import_preserves_state() {
        let (index, scope) = populated().await;
        let snapshot = index.export();

        let restored = FileIndex::with_lock_timeout(Duration::from_secs(1));
        restored.import(snapshot).unwrap();

        let one = restored.record(scope, &path("a/one.txt")).unwrap();
        assert_eq!(one.version_count(), 2);
        assert!(restored.record(scope, &path("a/b/two.txt")).unwrap().is_deleted());
        assert_eq!(restored.version_count(), 3);

        let (_, idx, _) = restored.find_version(one.version(1).unwrap().id).unwrap();
        assert_eq!(idx, 1);
    }

    #[tokio::test]
    async fn test_save_and_load_file() {
        let (index, scope) = populated().await;
        index.freeze_scope(scope);
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("nested/index.json");
        index.save_snapshot(&file).await.unwrap();

        let restored = FileIndex::with_lock_timeout(Duration::from_secs(1));
        restored.load_snapshot(&file).await.unwrap();
        assert!(restored.scope(scope).unwrap().is_frozen());
        let listed = restored.list_children(scope, &path("a")).unwrap();
        let names: Vec<String> = listed.iter().map(|n| n.name()).collect();
        assert_eq!(names, vec!["b".to_string(), "one.txt".to_string()]);
    }

    #[tokio::test]
    async fn test_malformed_snapshot_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("bad.json");
        tokio::fs::write(&file, b"{\"format\": 1, \"scopes\": 3}").await.unwrap();

        let index = FileIndex::with_lock_timeout(Duration::from_secs(1));
        let err = index.load_snapshot(&file).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Serialization);
    }

    #[tokio::test]
    async fn test_import_never_replaces_an_opened_scope() {
        let (index, scope) = populated().await;
        let snapshot = index.export_scope(scope).unwrap();

        let restored = FileIndex::with_lock_timeout(Duration::from_secs(1));
        restored
            .record_upload(
                scope,
                &path("fresh.txt"),
                ActorId::new(),
                LocationDescriptor::new("cloudfiles", "o9").unwrap(),
                VersionMetadata::default(),
            )
            .await
            .unwrap();

        let err = restored.import_scope(snapshot).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert!(restored.record(scope, &path("fresh.txt")).is_ok());
        assert!(restored.record(scope, &path("a/one.txt")).is_err());
        assert_eq!(restored.version_count(), 1);
    }

    #[tokio::test]
    async fn test_misplaced_record_is_rejected() {
        let (index, scope) = populated().await;
        let mut snapshot = index.export_scope(scope).unwrap();
        if let NodeSnapshot::Directory { children, .. } = &mut snapshot.children[0] {
            for child in children.iter_mut() {
                if let NodeSnapshot::File(record) = child {
                    record.path = path("elsewhere/one.txt");
                }
            }
        }

        let restored = FileIndex::with_lock_timeout(Duration::from_secs(1));
        let err = restored.import_scope(snapshot).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Serialization);
        assert!(restored.scope(scope).is_none());
    }
}
