//! Revision history command.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use trove_core::error::AppError;
use trove_core::types::ScopeId;
use trove_service::RequestContext;
use trove_service::file::revisions::RevisionSummary;

use crate::app::App;
use crate::output::{self, OutputFormat};

/// Arguments for `revisions`
#[derive(Debug, Args)]
pub struct RevisionsArgs {
    /// Scope id
    #[arg(short, long)]
    pub scope: ScopeId,
    /// File path
    pub path: String,
    /// Zero-based page
    #[arg(short, long)]
    pub page: Option<String>,
}

/// Revision row
#[derive(Debug, Serialize, Tabled)]
struct RevisionRow {
    /// Version
    version: usize,
    /// Id
    id: String,
    /// Creator
    creator: String,
    /// Size
    size: String,
    /// Uploaded
    uploaded: String,
}

impl From<RevisionSummary> for RevisionRow {
    fn from(summary: RevisionSummary) -> Self {
        Self {
            version: summary.index,
            id: summary.version_id.to_string(),
            creator: summary.creator.to_string(),
            size: output::or_dash(summary.size),
            uploaded: summary.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Execute `revisions`
pub async fn execute(args: &RevisionsArgs, app: &App, format: OutputFormat) -> Result<(), AppError> {
    let ctx = RequestContext::anonymous(args.scope);
    let listing = app
        .revisions
        .list_revisions(&ctx, &args.path, args.page.as_deref())
        .await?;
    match format {
        OutputFormat::Json => output::print_item(&listing, format),
        OutputFormat::Table => {
            let more = listing.more;
            let rows: Vec<RevisionRow> = listing.revisions.into_iter().map(RevisionRow::from).collect();
            output::print_list(&rows, format);
            if more {
                println!("More revisions on the next page.");
            }
        }
    }
    Ok(())
}
