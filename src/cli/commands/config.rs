//! Config command - show current configuration

use crate::cli::output::{self, colors};
use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::core::services::Services;
use crate::core::xdg::XdgDirs;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Also show resolved XDG paths
    #[arg(long, short = 'p')]
    pub paths: bool,
}

/// Configuration response
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub version: String,
    #[serde(flatten)]
    pub config: Config,
    pub indexes_dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<PathsInfo>,
}

#[derive(Debug, Serialize)]
pub struct PathsInfo {
    pub config_dir: String,
    pub config_file: String,
    pub data_dir: String,
}

/// Execute the config command
pub fn execute(
    args: ConfigArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = services.config.as_ref().clone();

    let paths = args.paths.then(|| {
        let xdg = XdgDirs::new();
        PathsInfo {
            config_dir: xdg.config_dir.to_string_lossy().into_owned(),
            config_file: xdg.config_file().to_string_lossy().into_owned(),
            data_dir: xdg.data_dir.to_string_lossy().into_owned(),
        }
    });

    let response = ConfigResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        indexes_dir: config.indexes_dir().to_string_lossy().into_owned(),
        config,
        paths,
    };

    match format {
        OutputFormat::Human => {
            println!("tessera {}", response.version);
            println!("{}:", colors::label("Configuration"));
            println!("  storage:");
            println!(
                "    data_dir: {}",
                colors::file_path(&response.config.storage.data_dir.to_string_lossy())
            );
            println!(
                "    default_storage_type: {}",
                response.config.storage.default_storage_type
            );
            println!("  writer:");
            println!(
                "    heap_size_mb: {}",
                colors::number(&response.config.writer.heap_size_mb.to_string())
            );
            println!(
                "    num_threads: {}",
                colors::number(&response.config.writer.num_threads.to_string())
            );
            println!("  indexes_dir: {}", colors::file_path(&response.indexes_dir));

            if let Some(paths) = &response.paths {
                println!("{}:", colors::label("Paths"));
                println!("  config_dir: {}", colors::file_path(&paths.config_dir));
                println!("  config_file: {}", colors::file_path(&paths.config_file));
                println!("  data_dir: {}", colors::file_path(&paths.data_dir));
            }
        }
        OutputFormat::Json => output::print_json(&response)?,
    }

    Ok(())
}
