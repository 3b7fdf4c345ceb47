use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sig_types::Visibility;

#[derive(Parser)]
#[command(
    name = "sigdiff",
    about = "sigdiff -- compare API signature snapshots",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Comparison config file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Snapshot store directory; snapshot arguments become store labels
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show every API difference between two snapshots
    Compare(CompareArgs),
    /// Count differences and classify compatibility
    Summary(CompareArgs),
    /// Print the content digest of a snapshot file
    Digest(DigestArgs),
    /// Add, list, or remove stored snapshots
    Store(StoreArgs),
    /// Print the effective comparison config
    Config,
}

#[derive(Args)]
pub struct CompareArgs {
    /// Baseline snapshot (file path, or label with --store)
    pub from: String,
    /// New snapshot (file path, or label with --store)
    pub to: String,
    #[command(flatten)]
    pub filter: FilterArgs,
    /// Exit with status 1 if any change is breaking
    #[arg(long)]
    pub fail_on_breaking: bool,
}

/// Overrides for the loaded comparison config.
#[derive(Args, Default)]
pub struct FilterArgs {
    /// Ignore declarations less visible than this
    #[arg(long)]
    pub min_visibility: Option<Visibility>,
    #[arg(long)]
    pub ignore_annotations: bool,
    /// Skip a package and its subpackages (repeatable)
    #[arg(long = "ignore-package")]
    pub ignore_packages: Vec<String>,
}

#[derive(Args)]
pub struct DigestArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct StoreArgs {
    #[command(subcommand)]
    pub action: StoreAction,
}

#[derive(Subcommand)]
pub enum StoreAction {
    /// Validate a snapshot file and store it under its label
    Add { file: PathBuf },
    /// List stored labels
    List,
    /// Remove a stored snapshot
    Remove { label: String },
}
