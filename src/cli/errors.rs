//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::rev_index::IndexError;
use crate::revision::RevisionIdError;
use crate::workspace::AssociationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file missing, unreadable or invalid
    ConfigError,
    /// Bad command-line value
    InvalidArgument,
    /// No journals for the requested record type
    NotInitialized,
    /// Journal could not be replayed
    JournalError,
    /// stdout failure
    IoError,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "MULTIREV_CLI_CONFIG_ERROR",
            Self::InvalidArgument => "MULTIREV_CLI_INVALID_ARGUMENT",
            Self::NotInitialized => "MULTIREV_CLI_NOT_INITIALIZED",
            Self::JournalError => "MULTIREV_CLI_JOURNAL_ERROR",
            Self::IoError => "MULTIREV_CLI_IO_ERROR",
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidArgument, msg)
    }

    pub fn not_initialized(location: &str) -> Self {
        Self::new(
            CliErrorCode::NotInitialized,
            format!("No revision journal in {}", location),
        )
    }

    pub fn journal_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::JournalError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn code(&self) -> CliErrorCode {
        self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<RevisionIdError> for CliError {
    fn from(e: RevisionIdError) -> Self {
        Self::invalid_argument(e.to_string())
    }
}

impl From<IndexError> for CliError {
    fn from(e: IndexError) -> Self {
        Self::journal_error(format!("{} ({})", e, e.code()))
    }
}

impl From<AssociationError> for CliError {
    fn from(e: AssociationError) -> Self {
        Self::journal_error(format!("{} ({})", e, e.code()))
    }
}

pub type CliResult<T> = Result<T, CliError>;
