//! Error handling for the benchmark matrix engine
//!
//! Every failure is terminal for the invocation: the orchestrator stops at the
//! first error and hands it back to the caller, which reports it and exits.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// The main error type for the engine
#[derive(Error, Debug)]
pub enum BenchError {
    /// A required input file was not supplied
    #[error("{what} file expected but not presented.")]
    MissingInput { what: &'static str },

    /// A configuration or benchmark entry without a name
    #[error("each {kind} must have a name (entry #{index} has none)")]
    MissingName { kind: &'static str, index: usize },

    /// Input validation errors that are not about names
    #[error("Validation error: {0}")]
    Validation(String),

    /// An input file could not be decoded
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Filesystem errors while maintaining the artifact tree
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The external command could not be started
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        wrapper: bool,
        #[source]
        source: io::Error,
    },

    /// The external command ran and reported failure
    #[error("{program} failed: {status}")]
    CommandFailed { program: String, status: String },
}

impl BenchError {
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        BenchError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// True when the failure came from an external command rather than the
    /// engine's own inputs or filesystem bookkeeping.
    pub fn is_subprocess(&self) -> bool {
        matches!(
            self,
            BenchError::Spawn { .. } | BenchError::CommandFailed { .. }
        )
    }

    pub fn exit_code(&self) -> i32 {
        1
    }
}

pub type Result<T> = std::result::Result<T, BenchError>;

/// Format error for operator-facing display
pub fn format_error(error: &BenchError) -> String {
    match error {
        BenchError::MissingInput { .. } => error.to_string(),
        BenchError::MissingName { .. } => format!("ERROR: {}", error),
        BenchError::Spawn {
            program,
            wrapper: true,
            source,
        } => {
            format!(
                "Run wrapper '{}' could not be started: {}\n\nThe wrapper may not be available in this environment; check RunWrapper in the configurations file.",
                program, source
            )
        }
        BenchError::Spawn { program, source, .. } if source.kind() == io::ErrorKind::NotFound => {
            format!(
                "Command not found: {}\n\nCheck that Root points at a toolchain installation.",
                program
            )
        }
        _ => error.to_string(),
    }
}
