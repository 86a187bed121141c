//! CLI command definitions for kanvax.
//!
//! This module defines the CLI structure using clap's derive macros. The
//! main entry point is the `Cli` struct which contains subcommands.

pub mod export;
pub mod import;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::types::{PriorityFilter, StatusFilter, TaskFilters};

/// Kanvax task service and CLI tools
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the snapshot data file (overrides config)
    #[arg(short, long, global = true)]
    pub data_file: Option<PathBuf>,

    /// Port for the HTTP API (overrides config)
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP API server (default if no subcommand given)
    Serve,

    /// List tasks from the snapshot, grouped by status
    List(ListArgs),

    /// Show aggregate task statistics
    Stats,

    /// Export the store snapshot to a JSON backup file
    Export(export::ExportArgs),

    /// Import a snapshot file, replacing the current store contents
    Import(import::ImportArgs),
}

/// Arguments for the list subcommand
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Case-insensitive substring match on title or description
    #[arg(short, long)]
    pub search: Option<String>,

    /// Filter by status (todo, in-progress, done, all)
    #[arg(long, value_enum)]
    pub status: Option<CliStatusFilter>,

    /// Filter by priority (low, medium, high, all)
    #[arg(long, value_enum)]
    pub priority: Option<CliPriorityFilter>,

    /// Comma-separated tag ids (a task matching any is kept)
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,
}

impl ListArgs {
    pub fn to_filters(&self) -> TaskFilters {
        TaskFilters {
            search: self.search.clone().unwrap_or_default(),
            priority: self.priority.map(Into::into).unwrap_or_default(),
            status: self.status.map(Into::into).unwrap_or_default(),
            tags: self.tags.clone(),
        }
    }
}

/// clap-facing mirror of [`StatusFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliStatusFilter {
    All,
    Todo,
    InProgress,
    Done,
}

impl From<CliStatusFilter> for StatusFilter {
    fn from(value: CliStatusFilter) -> Self {
        match value {
            CliStatusFilter::All => StatusFilter::All,
            CliStatusFilter::Todo => StatusFilter::Todo,
            CliStatusFilter::InProgress => StatusFilter::InProgress,
            CliStatusFilter::Done => StatusFilter::Done,
        }
    }
}

/// clap-facing mirror of [`PriorityFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliPriorityFilter {
    All,
    Low,
    Medium,
    High,
}

impl From<CliPriorityFilter> for PriorityFilter {
    fn from(value: CliPriorityFilter) -> Self {
        match value {
            CliPriorityFilter::All => PriorityFilter::All,
            CliPriorityFilter::Low => PriorityFilter::Low,
            CliPriorityFilter::Medium => PriorityFilter::Medium,
            CliPriorityFilter::High => PriorityFilter::High,
        }
    }
}
