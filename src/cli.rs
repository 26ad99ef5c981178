//! Command line definitions (clap derive).

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// scormfix - SCORM package resume analysis and repair
#[derive(Parser, Debug)]
#[command(
    name = "scormfix",
    version,
    about = "Analyze and repair SCORM course packages",
    after_help = "Examples:\n    \
                  scormfix analyze course.zip\n    \
                  scormfix play course.zip\n    \
                  scormfix batch ./courses --repair --parallel\n    \
                  scormfix session call <id> LMSSetValue cmi.suspend_data abc"
)]
pub struct Cli {
    /// Settings file (JSON); defaults apply when absent
    #[arg(long, short = 'c', global = true, env = "SCORMFIX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Storage root for repaired archives and sessions
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify a package's resume capability
    Analyze(ArchiveArgs),

    /// Repair a package into the repaired area (or --output)
    Repair(RepairArgs),

    /// Build a fully instrumented copy of a package
    Instrument(ArchiveArgs),

    /// Repair a package and open a player session for it
    Play(ArchiveArgs),

    /// Analyze or repair every archive in a folder
    Batch(BatchArgs),

    /// Inspect and manage player sessions
    #[command(subcommand)]
    Session(SessionCommand),

    /// Show or write engine settings
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args, Debug)]
pub struct ArchiveArgs {
    /// Path to the package zip
    pub archive: PathBuf,
}

#[derive(Args, Debug)]
pub struct RepairArgs {
    /// Path to the package zip
    pub archive: PathBuf,

    /// Where to write the repaired archive
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Folder holding package zips
    pub folder: PathBuf,

    /// Repair each archive and open sessions instead of analyzing
    #[arg(long)]
    pub repair: bool,

    /// Process archives in parallel
    #[arg(long)]
    pub parallel: bool,
}

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// List all sessions
    List,

    /// Show one session
    Show { id: String },

    /// Delete a session directory
    Destroy { id: String },

    /// Resolve a launch-relative path to a file on disk
    Resolve { id: String, path: String },

    /// Invoke a persistence API method and store the resulting state
    Call {
        id: String,
        method: String,
        args: Vec<String>,
    },

    /// Current status message of a session
    Status { id: String },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print effective settings
    Show,

    /// Write effective settings to the --config file
    Init,
}
