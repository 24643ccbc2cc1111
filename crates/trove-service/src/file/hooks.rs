//! Hooks called by the storage worker: upload notification, metadata
//! confirmation, delete and the read-side locate.
//!
//! Payloads arrive as raw JSON. Structural problems (missing fields, a
//! blank or unparseable actor, malformed ids) are `BadRequest`; anything
//! past parsing is reported with the index's own error kinds.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use trove_core::error::{AppError, ErrorKind};
use trove_core::result::AppResult;
use trove_core::types::{ActorId, VersionId};
use trove_entity::path::NormalizedPath;
use trove_entity::version::{LocationDescriptor, Version, VersionMetadata};
use trove_index::FileIndex;
use trove_storage::{HookLocation, StorageLocationResolver};

use crate::context::RequestContext;
use crate::file::live::resolve_live;

/// Actor reference as sent by the worker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthPayload {
    /// Actor id.
    #[serde(default)]
    pub id: Option<String>,
}

/// A new version has been written by the storage worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadPayload {
    /// Who uploaded.
    pub auth: AuthPayload,
    /// Provider settings (bucket, container...).
    pub settings: Map<String, Value>,
    /// Object metadata; `name` is the object key, `provider` the service.
    pub metadata: Map<String, Value>,
    /// Content digests by algorithm.
    pub hashes: Map<String, Value>,
    /// Worker host information.
    pub worker: Map<String, Value>,
    /// File path, surrounding slashes allowed.
    pub path: String,
}

/// Final metadata for a previously notified version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmPayload {
    /// The version being confirmed.
    pub version_id: String,
    /// Metadata to merge.
    pub metadata: Map<String, Value>,
}

/// Delete request from the worker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeletePayload {
    /// File path.
    #[serde(default)]
    pub path: Option<String>,
    /// Who deletes.
    #[serde(default)]
    pub auth: Option<AuthPayload>,
}

/// Read-hook request from the worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatePayload {
    /// File path.
    pub path: String,
}

/// Answer to an upload notification.
#[derive(Debug, Clone, Serialize)]
pub struct UploadReceipt {
    /// Always `"success"`.
    pub status: &'static str,
    /// The new version's id.
    pub version_id: VersionId,
    /// Whether the file record was created by this upload.
    pub created: bool,
}

impl UploadReceipt {
    /// Status the request layer answers with: 201 on creation, 200 otherwise.
    pub fn status_code(&self) -> u16 {
        if self.created { 201 } else { 200 }
    }
}

fn parse_payload<T: DeserializeOwned>(payload: Value, what: &str) -> AppResult<T> {
    serde_json::from_value(payload)
        .map_err(|e| AppError::bad_request(format!("Malformed {what} payload: {e}")))
}

fn parse_actor(auth: &AuthPayload) -> AppResult<ActorId> {
    let raw = auth
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::bad_request("Payload does not name an actor"))?;
    raw.parse()
        .map_err(|_| AppError::bad_request(format!("Unknown actor '{raw}'")))
}

fn required_str<'a>(map: &'a Map<String, Value>, key: &str) -> AppResult<&'a str> {
    map.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::bad_request(format!("Metadata is missing '{key}'")))
}

/// Handles storage worker callbacks.
#[derive(Debug, Clone)]
pub struct HookService {
    index: Arc<FileIndex>,
    resolver: Arc<dyn StorageLocationResolver>,
}

impl HookService {
    /// Creates a new hook service.
    pub fn new(index: Arc<FileIndex>, resolver: Arc<dyn StorageLocationResolver>) -> Self {
        Self { index, resolver }
    }

    /// Record a newly uploaded version.
    pub async fn upload(&self, ctx: &RequestContext, payload: Value) -> AppResult<UploadReceipt> {
        let payload: UploadPayload = parse_payload(payload, "upload")?;
        let actor = parse_actor(&payload.auth)?;
        let path = NormalizedPath::parse(&payload.path)?;

        let location = LocationDescriptor::new(
            required_str(&payload.metadata, "provider")?,
            required_str(&payload.metadata, "name")?,
        )?
        .with_extra(payload.settings)
        .with_extra(payload.worker);
        let metadata = VersionMetadata::from_json(payload.metadata)?.with_hashes(payload.hashes)?;

        let outcome = self
            .index
            .record_upload(ctx.scope_id, &path, actor, location, metadata)
            .await?;

        Ok(UploadReceipt {
            status: "success",
            version_id: outcome.version.id,
            created: outcome.created,
        })
    }

    /// Merge the worker's final metadata into a version.
    ///
    /// A version id the index does not know is the worker's mistake and is
    /// answered with `BadRequest`.
    pub fn confirm(&self, payload: Value) -> AppResult<Version> {
        let payload: ConfirmPayload = parse_payload(payload, "confirm")?;
        let version_id: VersionId = payload
            .version_id
            .trim()
            .parse()
            .map_err(|_| AppError::bad_request(format!("Invalid version id '{}'", payload.version_id)))?;
        let metadata = VersionMetadata::from_json(payload.metadata)?;

        self.index
            .update_metadata(version_id, metadata)
            .map_err(|err| match err.kind {
                ErrorKind::NotFound => AppError::bad_request(err.message),
                _ => err,
            })
    }

    /// Soft-delete a file on the worker's behalf.
    pub fn delete(&self, ctx: &RequestContext, payload: Value) -> AppResult<()> {
        let payload: DeletePayload = parse_payload(payload, "delete")?;
        let raw = payload
            .path
            .ok_or_else(|| AppError::not_found("Delete payload names no file"))?;
        let path = NormalizedPath::parse(&raw)?;
        let record = self.index.record(ctx.scope_id, &path)?;

        let actor = parse_actor(&payload.auth.unwrap_or_default())?;
        self.index.delete(&record, actor).inspect_err(|err| {
            warn!(scope_id = %ctx.scope_id, path = %path, error = %err, "Hook delete rejected");
        })?;
        info!(scope_id = %ctx.scope_id, path = %path, actor_id = %actor, "File deleted via hook");
        Ok(())
    }

    /// Tell the worker where a version's bytes are.
    pub async fn locate(
        &self,
        ctx: &RequestContext,
        payload: Value,
        specifier: Option<&str>,
    ) -> AppResult<HookLocation> {
        let payload: LocatePayload = parse_payload(payload, "locate")?;
        let path = NormalizedPath::parse(&payload.path)?;
        let live = resolve_live(&self.index, ctx.scope_id, &path, specifier)?;
        self.resolver.locate(&live.version).await
    }
}
