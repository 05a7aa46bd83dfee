//! CLI argument definitions using clap
//!
//! Commands:
//! - multirev revisions  --config <path> --entity-type <type> --document <uuid> [--workspace <id>]
//! - multirev branches   --config <path> --entity-type <type> --document <uuid> [--workspace <id>]
//! - multirev workspaces --config <path> --entity-type <type> --document <uuid>

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// multirev - revision history inspector
#[derive(Parser, Debug)]
#[command(name = "multirev")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Selects one document of one record type.
#[derive(Args, Debug, Clone)]
pub struct Target {
    /// Path to configuration file
    #[arg(long, default_value = "./multirev.json")]
    pub config: PathBuf,

    /// Record type whose journals are inspected
    #[arg(long)]
    pub entity_type: String,

    /// Document UUID
    #[arg(long)]
    pub document: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every indexed revision of a document with its status
    Revisions {
        #[command(flatten)]
        target: Target,

        /// Only revisions written in this workspace
        #[arg(long)]
        workspace: Option<String>,
    },

    /// Show the revision tree of a document in one workspace
    Branches {
        #[command(flatten)]
        target: Target,

        /// Workspace scope (defaults to the configured default workspace)
        #[arg(long)]
        workspace: Option<String>,
    },

    /// List the workspaces tracking a document
    Workspaces {
        #[command(flatten)]
        target: Target,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
