//! Analyze command - show the tokens an analyzer produces
//!
//! With `--index`, analyzers declared in that index's settings are used
//! first; otherwise only built-in analyzer types are available.

use crate::cli::output::{self, colors};
use crate::cli::OutputFormat;
use crate::core::analysis::{analyze, builtin_analyzer, DEFAULT_ANALYZER};
use crate::core::services::Services;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the analyze command
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Text to analyze
    pub text: String,

    /// Analyzer name
    #[arg(long, short = 'a')]
    pub analyzer: Option<String>,

    /// Resolve the analyzer against this index
    #[arg(long, short = 'i')]
    pub index: Option<String>,
}

/// Analyze response
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analyzer: String,
    pub tokens: Vec<String>,
}

/// Execute the analyze command
pub fn execute(
    args: AnalyzeArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let declared = match &args.index {
        Some(name) => Some(services.get_index(name)?),
        None => None,
    };

    // An index's own "default" wins when no analyzer is named
    let name = match (&args.analyzer, &declared) {
        (Some(name), _) => name.clone(),
        (None, Some(index)) if index.analyzer(DEFAULT_ANALYZER).is_some() => {
            DEFAULT_ANALYZER.to_string()
        }
        (None, _) => "standard".to_string(),
    };

    let analyzer = match declared.as_ref().and_then(|index| index.analyzer(&name)) {
        Some(analyzer) => analyzer,
        None => builtin_analyzer(&name)?,
    };

    let response = AnalyzeResponse {
        tokens: analyze(&analyzer, &args.text),
        analyzer: name,
    };

    match format {
        OutputFormat::Human => {
            println!(
                "{} ({}):",
                colors::label("Tokens"),
                colors::dim(&response.analyzer)
            );
            for (position, token) in response.tokens.iter().enumerate() {
                println!("  {:>3}  {}", position, colors::token(token));
            }
        }
        OutputFormat::Json => output::print_json(&response)?,
    }

    Ok(())
}
