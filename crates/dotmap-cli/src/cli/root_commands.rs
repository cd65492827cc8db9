use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Scan a repository and store its build graph.
    Scan(ScanArgs),
    /// List stored scans, newest first.
    List(ListArgs),
    /// Show one scan with its row counts, or its whole graph.
    Show(ShowArgs),
    /// Delete a scan and everything it owns.
    Delete(DeleteArgs),
    /// Show the foreign keys and delete rules of the graph tables.
    Schema,
}

#[derive(Clone, Debug, Args)]
pub struct ScanArgs {
    /// Repository root directory
    pub path: PathBuf,

    /// Cancel the scan if it has not finished after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

#[derive(Clone, Debug, Args)]
pub struct ListArgs {
    /// Max scans to return (defaults to `general.default_limit`)
    #[arg(short, long)]
    pub limit: Option<u32>,
}

#[derive(Clone, Debug, Args)]
pub struct ShowArgs {
    pub scan_id: i64,

    /// Print every node and edge instead of counts
    #[arg(long)]
    pub graph: bool,
}

#[derive(Clone, Debug, Args)]
pub struct DeleteArgs {
    pub scan_id: i64,
}
