//! Version resolution command.

use clap::Args;
use serde::Serialize;

use trove_core::error::AppError;
use trove_core::types::{ActorId, ScopeId, VersionId};
use trove_service::file::version_links;
use trove_service::{DownloadMode, RequestContext};

use crate::app::App;
use crate::output::{self, OutputFormat};

/// Arguments for `resolve`
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Scope id
    #[arg(short, long)]
    pub scope: ScopeId,
    /// File path
    pub path: String,
    /// One-based version; the latest when omitted
    #[arg(short = 'V', long)]
    pub version: Option<String>,
    /// Issue a download URL and count the download
    #[arg(long)]
    pub download: bool,
}

/// Resolved version details
#[derive(Debug, Serialize)]
struct Resolved {
    name: String,
    path: String,
    revision: String,
    version_id: VersionId,
    creator: ActorId,
    size: Option<u64>,
    other_versions: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    download_url: Option<String>,
}

/// Execute `resolve`
pub async fn execute(args: &ResolveArgs, app: &App, format: OutputFormat) -> Result<(), AppError> {
    let ctx = RequestContext::anonymous(args.scope);
    let live = app.views.resolve(&ctx, &args.path, args.version.as_deref())?;

    let download_url = if args.download {
        let ticket = app
            .views
            .download(&ctx, &args.path, args.version.as_deref(), DownloadMode::Download)
            .await?;
        Some(ticket.url)
    } else {
        None
    };

    let total = live.record.version_count();
    let resolved = Resolved {
        name: live.record.name(),
        path: live.record.path().display_path(),
        revision: format!("Version {}", live.index),
        version_id: live.version.id,
        creator: live.version.creator,
        size: live.version.size(),
        other_versions: version_links(total)
            .into_iter()
            .filter(|i| *i != live.index)
            .collect(),
        download_url,
    };

    match format {
        OutputFormat::Json => output::print_item(&resolved, format),
        OutputFormat::Table => {
            output::print_kv("name", &resolved.name);
            output::print_kv("path", &resolved.path);
            output::print_kv("revision", &resolved.revision);
            output::print_kv("version id", &resolved.version_id.to_string());
            output::print_kv("creator", &resolved.creator.to_string());
            output::print_kv("size", &output::or_dash(resolved.size));
            if let Some(url) = &resolved.download_url {
                output::print_kv("download", url);
            }
        }
    }
    Ok(())
}
