//! CLI command definitions and dispatch.

pub mod config;
pub mod delete;
pub mod freeze;
pub mod ls;
pub mod resolve;
pub mod revisions;
pub mod upload;

use clap::{Parser, Subcommand};

use trove_core::config::AppConfig;
use trove_core::error::AppError;

use crate::app::App;
use crate::output::OutputFormat;

/// Trove: versioned file index for research projects
#[derive(Debug, Parser)]
#[command(name = "trove", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file; defaults to `config/default` plus the `TROVE_ENV` overlay
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List a folder
    Ls(ls::LsArgs),
    /// Show a file's revision history
    Revisions(revisions::RevisionsArgs),
    /// Resolve a file version
    Resolve(resolve::ResolveArgs),
    /// Record an uploaded version
    Upload(upload::UploadArgs),
    /// Soft-delete a file
    Delete(delete::DeleteArgs),
    /// Freeze a scope as a registration
    Freeze(freeze::FreezeArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        if let Commands::Config(args) = &self.command {
            return config::execute(args, &config, self.format);
        }

        let app = App::open(config).await?;
        match &self.command {
            Commands::Ls(args) => ls::execute(args, &app, self.format),
            Commands::Revisions(args) => revisions::execute(args, &app, self.format).await,
            Commands::Resolve(args) => resolve::execute(args, &app, self.format).await,
            Commands::Upload(args) => upload::execute(args, &app, self.format).await,
            Commands::Delete(args) => delete::execute(args, &app).await,
            Commands::Freeze(args) => freeze::execute(args, &app).await,
            Commands::Config(_) => Ok(()),
        }
    }
}
