//! Folder listing command.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use trove_core::error::AppError;
use trove_core::types::ScopeId;
use trove_service::RequestContext;
use trove_service::folder::TreeEntry;

use crate::app::App;
use crate::output::{self, OutputFormat};

/// Arguments for `ls`
#[derive(Debug, Args)]
pub struct LsArgs {
    /// Scope id
    #[arg(short, long)]
    pub scope: ScopeId,
    /// Folder path; the scope root when omitted
    #[arg(default_value = "")]
    pub path: String,
}

/// Listing row
#[derive(Debug, Serialize, Tabled)]
struct EntryRow {
    /// Name
    name: String,
    /// Kind
    kind: String,
    /// Versions
    versions: String,
    /// Size
    size: String,
    /// Modified
    modified: String,
}

impl From<TreeEntry> for EntryRow {
    fn from(entry: TreeEntry) -> Self {
        Self {
            name: entry.name,
            kind: entry.kind.to_string(),
            versions: output::or_dash(entry.version_count),
            size: output::or_dash(entry.size),
            modified: output::or_dash(entry.modified.map(|m| m.format("%Y-%m-%d %H:%M").to_string())),
        }
    }
}

/// Execute `ls`
pub fn execute(args: &LsArgs, app: &App, format: OutputFormat) -> Result<(), AppError> {
    let ctx = RequestContext::anonymous(args.scope);
    let entries = app.tree.list(&ctx, &args.path)?;
    match format {
        OutputFormat::Json => output::print_item(&entries, format),
        OutputFormat::Table => {
            let rows: Vec<EntryRow> = entries.into_iter().map(EntryRow::from).collect();
            output::print_list(&rows, format);
        }
    }
    Ok(())
}
