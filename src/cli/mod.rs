//! Diagnostics CLI
//!
//! - revisions: every indexed revision of a document
//! - branches: revision tree, winner and default branch in one workspace
//! - workspaces: workspace associations of a document

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, Target};
pub use commands::{branches, revisions, run, run_command, workspaces};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
