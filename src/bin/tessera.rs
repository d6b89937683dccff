//! Tessera CLI - manage the index registry from the command line
//!
//! # Examples
//!
//! ```bash
//! # Create an index backed by disk
//! tessera create-index logs --storage-type disk
//!
//! # List indexes with their statistics
//! tessera list-indexes
//!
//! # Try an analyzer
//! tessera analyze "Quick Brown Foxes" --analyzer standard
//! ```

use clap::Parser;
use tessera::cli::{init_logging, output, run, Cli};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    if let Err(e) = run(cli) {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}
