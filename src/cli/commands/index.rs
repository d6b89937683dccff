//! Index commands - list, info, create, delete indexes
//!
//! - `list-indexes`
//! - `get-index-info`
//! - `create-index`
//! - `delete-index`

use crate::cli::output::{self, colors, format_bytes, format_relative_time};
use crate::cli::OutputFormat;
use crate::core::metadata::{IndexSettings, Mappings};
use crate::core::services::Services;
use crate::core::types::{IndexSummary, StorageType};
use clap::Args;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{self, Write};
use std::sync::Arc;

/// Arguments for list-indexes
#[derive(Args, Debug)]
pub struct ListArgs {}

/// Arguments for get-index-info
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Index name
    pub name: String,

    /// Open the writer and refresh statistics before reporting
    #[arg(long, short = 'r')]
    pub refresh: bool,
}

/// Arguments for create-index
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Index name
    pub name: String,

    /// Storage backend (disk, memory, s3); defaults to the configured one
    #[arg(long, short = 't')]
    pub storage_type: Option<StorageType>,

    /// Settings as JSON, or @path to a JSON file
    #[arg(long)]
    pub settings: Option<String>,

    /// Mappings as JSON, or @path to a JSON file
    #[arg(long)]
    pub mappings: Option<String>,
}

/// Arguments for delete-index
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Index name
    pub name: String,

    /// Skip confirmation prompt
    #[arg(long, short = 'f')]
    pub force: bool,
}

/// Index list response
#[derive(Debug, Serialize)]
pub struct IndexListResponse {
    pub count: usize,
    pub indexes: Vec<IndexSummary>,
}

/// Detailed index info
#[derive(Debug, Serialize)]
pub struct IndexInfoResponse {
    #[serde(flatten)]
    pub summary: IndexSummary,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<IndexSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mappings: Option<Mappings>,
}

/// Parse inline JSON, or the contents of a file when prefixed with `@`
fn parse_json_arg<T: DeserializeOwned>(
    what: &str,
    value: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    let body = match value.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {what} file '{path}': {e}"))?,
        None => value.to_string(),
    };
    serde_json::from_str(&body).map_err(|e| format!("Invalid {what} JSON: {e}").into())
}

fn not_found(name: &str) -> String {
    format!("Index '{name}' not found. Run 'tessera list-indexes' to see available indexes.")
}

/// Execute list-indexes command
pub fn execute_list(
    _args: ListArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let indexes: Vec<IndexSummary> = services.registry.list().iter().map(|i| i.summary()).collect();
    let response = IndexListResponse {
        count: indexes.len(),
        indexes,
    };

    match format {
        OutputFormat::Human => {
            if response.indexes.is_empty() {
                println!(
                    "No indexes found. Run '{}' to create one.",
                    colors::label("tessera create-index <name>")
                );
            } else {
                println!(
                    "{} ({}):",
                    colors::label("Indexes"),
                    colors::number(&response.count.to_string())
                );
                for index in &response.indexes {
                    println!(
                        "  {:<24} {:<8} {:>10} docs  {:>10}",
                        colors::index_name(&index.name),
                        index.storage_type.as_str(),
                        colors::number(&index.docs_count.to_string()),
                        colors::number(&format_bytes(index.storage_size)),
                    );
                }
            }
        }
        OutputFormat::Json => output::print_json(&response)?,
    }

    Ok(())
}

/// Execute get-index-info command
pub fn execute_info(
    args: InfoArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let index = services
        .get_index(&args.name)
        .map_err(|_| not_found(&args.name))?;

    if args.refresh {
        match index.get_writer() {
            Ok(_) => {
                services.sync_index(&args.name)?;
            }
            Err(e) => output::print_warning(&format!("Could not refresh statistics: {e}")),
        }
    }

    let definition = index.definition();
    let response = IndexInfoResponse {
        summary: index.summary(),
        created_at: definition.created_at.to_rfc3339(),
        updated_at: definition.updated_at.to_rfc3339(),
        settings: definition.settings,
        mappings: definition.mappings,
    };

    match format {
        OutputFormat::Human => {
            let summary = &response.summary;
            println!(
                "{}: {}",
                colors::label("Index"),
                colors::index_name(&summary.name)
            );
            println!("  {}: {}", colors::label("Storage"), summary.storage_type);
            println!(
                "  {}: {}",
                colors::label("Documents"),
                colors::number(&summary.docs_count.to_string())
            );
            println!(
                "  {}: {}",
                colors::label("Size"),
                colors::number(&format_bytes(summary.storage_size))
            );
            println!(
                "  {}: {}",
                colors::label("Writer"),
                if summary.writer_open { "open" } else { "closed" }
            );
            println!(
                "  {}: {}",
                colors::label("Created"),
                colors::dim(&format_relative_time(&definition.created_at))
            );
            if !summary.analyzers.is_empty() {
                println!(
                    "  {}: {}",
                    colors::label("Analyzers"),
                    summary.analyzers.join(", ")
                );
            }
            if let Some(mappings) = &response.mappings {
                println!("  {}:", colors::label("Mappings"));
                for (field, property) in &mappings.properties {
                    let analyzer = property.analyzer.as_deref().unwrap_or("-");
                    println!(
                        "    {:<20} {:<8} {}",
                        field,
                        serde_json::to_value(property.kind)?
                            .as_str()
                            .unwrap_or_default(),
                        colors::dim(analyzer)
                    );
                }
            }
        }
        OutputFormat::Json => output::print_json(&response)?,
    }

    Ok(())
}

/// Execute create-index command
pub fn execute_create(
    args: CreateArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings: Option<IndexSettings> = args
        .settings
        .as_deref()
        .map(|s| parse_json_arg("settings", s))
        .transpose()?;
    let mappings: Option<Mappings> = args
        .mappings
        .as_deref()
        .map(|m| parse_json_arg("mappings", m))
        .transpose()?;

    let index = services.create_index(&args.name, args.storage_type, settings, mappings)?;

    output::print_result(
        &format!(
            "Created index '{}' ({})",
            index.name(),
            index.storage_type()
        ),
        serde_json::json!({
            "created": true,
            "index": index.name(),
            "storage_type": index.storage_type(),
        }),
        format,
    );

    Ok(())
}

/// Execute delete-index command
pub fn execute_delete(
    args: DeleteArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    if !services.registry.contains(&args.name) {
        return Err(not_found(&args.name).into());
    }

    // Confirmation prompt unless --force
    if !args.force {
        print!(
            "Delete index '{}'? [y/N] ",
            colors::index_name(&args.name)
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("{}", colors::dim("Cancelled."));
            return Ok(());
        }
    }

    services.delete_index(&args.name)?;

    output::print_result(
        &format!("Deleted index '{}'", args.name),
        serde_json::json!({
            "deleted": true,
            "index": args.name,
        }),
        format,
    );

    Ok(())
}
