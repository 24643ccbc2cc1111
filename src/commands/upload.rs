//! Upload notification command.

use clap::Args;
use serde_json::{Map, Value, json};

use trove_core::error::AppError;
use trove_core::types::{ActorId, ScopeId};
use trove_service::RequestContext;

use crate::app::App;
use crate::output::{self, OutputFormat};

/// Arguments for `upload`
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Scope id
    #[arg(short, long)]
    pub scope: ScopeId,
    /// File path
    pub path: String,
    /// Uploading actor
    #[arg(short, long)]
    pub actor: ActorId,
    /// Object key in the store
    #[arg(short, long)]
    pub object: String,
    /// Storage provider
    #[arg(long, default_value = "cloudfiles")]
    pub provider: String,
    /// Provider resource (bucket or container)
    #[arg(long)]
    pub resource: Option<String>,
    /// Content size in bytes
    #[arg(long)]
    pub size: Option<u64>,
    /// Content digest as `algorithm=digest`; repeatable
    #[arg(long = "hash")]
    pub hashes: Vec<String>,
}

fn parse_hashes(raw: &[String]) -> Result<Map<String, Value>, AppError> {
    raw.iter()
        .map(|pair| {
            pair.split_once('=')
                .filter(|(alg, digest)| !alg.is_empty() && !digest.is_empty())
                .map(|(alg, digest)| (alg.to_string(), Value::String(digest.to_string())))
                .ok_or_else(|| AppError::bad_request(format!("Hash '{pair}' is not algorithm=digest")))
        })
        .collect()
}

/// Execute `upload`
pub async fn execute(args: &UploadArgs, app: &App, format: OutputFormat) -> Result<(), AppError> {
    let mut settings = Map::new();
    if let Some(resource) = &args.resource {
        settings.insert(app.config.storage.resource_key.clone(), json!(resource));
    }
    let mut metadata = Map::new();
    metadata.insert("name".into(), json!(args.object));
    metadata.insert("provider".into(), json!(args.provider));
    if let Some(size) = args.size {
        metadata.insert("size".into(), json!(size));
    }

    let payload = json!({
        "auth": {"id": args.actor.to_string()},
        "settings": settings,
        "metadata": metadata,
        "hashes": parse_hashes(&args.hashes)?,
        "worker": {},
        "path": args.path,
    });

    let ctx = RequestContext::for_actor(args.scope, args.actor);
    let receipt = app.hooks.upload(&ctx, payload).await?;
    app.persist().await?;

    match format {
        OutputFormat::Json => output::print_item(&receipt, format),
        OutputFormat::Table => {
            let verb = if receipt.created { "Created" } else { "Updated" };
            output::print_success(&format!("{verb} '{}' (version {})", args.path, receipt.version_id));
        }
    }
    Ok(())
}
