//! Import subcommand for the kanvax CLI
//!
//! Replaces the current store contents from a snapshot file (plain JSON or
//! gzip).

use clap::Args;
use std::path::PathBuf;

/// Arguments for the import subcommand
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Snapshot file to import
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Parse and report what would be imported without writing anything
    #[arg(long)]
    pub dry_run: bool,
}
