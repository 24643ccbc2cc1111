//! Configuration CLI commands.

use clap::{Args, Subcommand};

use trove_core::config::AppConfig;
use trove_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
}

/// Execute config commands
pub fn execute(args: &ConfigArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    match args.command {
        ConfigCommand::Show => match format {
            OutputFormat::Json => output::print_item(config, format),
            OutputFormat::Table => {
                output::print_kv("snapshot", &config.index.snapshot_path);
                output::print_kv("lock timeout (ms)", &config.index.lock_timeout_ms.to_string());
                output::print_kv("revision page size", &config.revisions.page_size.to_string());
                output::print_kv("render cache ttl (s)", &config.render.cache_ttl_seconds.to_string());
                output::print_kv("render queue", &config.render.queue_capacity.to_string());
                output::print_kv("download base url", &config.storage.download_base_url);
                output::print_kv("cache provider", &config.cache.provider);
                output::print_kv("log level", &config.logging.level);
            }
        },
    }
    Ok(())
}
