//! Benchmatrix engine library
//!
//! Builds Go test binaries for every active configuration × benchmark pair,
//! runs them a requested number of times, and closes the PGO loop by merging
//! one configuration's CPU profiles so another configuration can build with
//! them.

pub mod artifacts;
pub mod builder;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod merger;
pub mod orchestrator;
pub mod runner;
pub mod selector;
pub mod session;
pub mod toolchain;

// Re-export commonly used types
pub use artifacts::ArtifactStore;
pub use config::{Benchmark, BenchmarkList, Configuration, ConfigurationList};
pub use context::{CommandSpec, ExecutionContext, StdoutTarget};
pub use error::{format_error, BenchError, Result};
pub use executor::{CommandExecutor, ProcessExecutor};
pub use orchestrator::{log_warnings, Orchestrator, RunOptions, RunSummary};
pub use selector::{select, Selection, SelectionRequest, SelectionWarning};
pub use toolchain::Toolchain;
