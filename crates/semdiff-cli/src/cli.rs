use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "semdiff",
    about = "Semantic diffs for data files, source declarations and patches",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML configuration file (defaults to ./.semdiff.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare two files on disk
    Compare(CompareArgs),
    /// Compare a file between two revisions of a git repository
    Revisions(RevisionsArgs),
    /// Rewrite a multi-file unified diff with semantic sections
    Patch(PatchArgs),
    /// Show the diff strategy chosen for each path
    Detect(DetectArgs),
    /// List supported formats
    Formats,
}

#[derive(Args)]
pub struct CompareArgs {
    pub base: PathBuf,
    pub head: PathBuf,
    /// Path used for format detection (defaults to the head file name)
    #[arg(long)]
    pub path: Option<String>,
}

#[derive(Args)]
pub struct RevisionsArgs {
    pub path: String,
    pub base_ref: String,
    #[arg(default_value = "HEAD")]
    pub head_ref: String,
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,
}

#[derive(Args)]
pub struct PatchArgs {
    /// Patch file to read; stdin when omitted
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct DetectArgs {
    pub paths: Vec<String>,
}
