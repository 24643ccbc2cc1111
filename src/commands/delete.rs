//! Delete command.

use clap::Args;
use serde_json::json;

use trove_core::error::AppError;
use trove_core::types::{ActorId, ScopeId};
use trove_service::RequestContext;

use crate::app::App;
use crate::output;

/// Arguments for `delete`
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Scope id
    #[arg(short, long)]
    pub scope: ScopeId,
    /// File path
    pub path: String,
    /// Deleting actor
    #[arg(short, long)]
    pub actor: ActorId,
}

/// Execute `delete`
pub async fn execute(args: &DeleteArgs, app: &App) -> Result<(), AppError> {
    let ctx = RequestContext::for_actor(args.scope, args.actor);
    app.hooks.delete(
        &ctx,
        json!({"path": args.path, "auth": {"id": args.actor.to_string()}}),
    )?;
    app.persist().await?;
    output::print_success(&format!("Deleted '{}'", args.path));
    Ok(())
}
