//! Error types for easycert.
//!
//! Every operation is fail-fast: the first filesystem or external-process
//! failure is returned to the caller, which reports it and exits.

use std::process::ExitStatus;
use thiserror::Error;

/// The main error type for easycert operations.
#[derive(Error, Debug)]
pub enum EasyCertError {
    /// The OpenSSL executable could not be located
    #[error("OpenSSL is not installed: `{0}` not found")]
    ToolNotFound(String),

    /// OpenSSL ran but exited unsuccessfully
    #[error("openssl {command} failed ({status}): {stderr}")]
    ToolFailed {
        /// The OpenSSL subcommand that was run (e.g. `req`, `ca`).
        command: String,
        /// Exit status of the process.
        status: ExitStatus,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// Filesystem I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A file the operation depends on is missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// An output path is already present
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// The invocation needs a certificate name and none was given
    #[error("Missing required name argument")]
    MissingName,

    /// RSA key size rejected
    #[error("Invalid key size: {0}")]
    InvalidKeySize(String),

    /// Entry of a `--host` list rejected
    #[error("Invalid host: {0:?}")]
    InvalidHost(String),

    /// The per-user root could not be derived
    #[error("Could not determine the home directory")]
    HomeNotFound,

    /// The local hostname could not be read
    #[error(
        "Could not get hostname: {0}\n\nYou may want to fix your '/etc/hosts' and/or DNS setup"
    )]
    Hostname(String),

    /// Template rendering error
    #[error("Template error: {0}")]
    Template(String),
}

impl EasyCertError {
    /// Build an [`EasyCertError::AlreadyExists`] naming `what` at `path`.
    pub fn already_exists(what: &str, path: &std::path::Path) -> Self {
        EasyCertError::AlreadyExists(format!("{} {:?}", what, path))
    }

    /// Build an [`EasyCertError::NotFound`] naming `what` at `path`.
    pub fn not_found(what: &str, path: &std::path::Path) -> Self {
        EasyCertError::NotFound(format!("{} {:?}", what, path))
    }
}

/// A specialized Result type for easycert operations.
pub type Result<T> = std::result::Result<T, EasyCertError>;
