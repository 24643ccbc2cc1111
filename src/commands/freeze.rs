//! Scope freeze command.

use clap::Args;

use trove_core::error::AppError;
use trove_core::types::ScopeId;

use crate::app::App;
use crate::output;

/// Arguments for `freeze`
#[derive(Debug, Args)]
pub struct FreezeArgs {
    /// Scope id
    #[arg(short, long)]
    pub scope: ScopeId,
}

/// Execute `freeze`
pub async fn execute(args: &FreezeArgs, app: &App) -> Result<(), AppError> {
    app.scopes.freeze(args.scope);
    app.persist().await?;
    output::print_success(&format!("Scope {} is now a registration", args.scope));
    Ok(())
}
