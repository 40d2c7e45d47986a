//! Drives the select → build → run → merge pipeline over the active matrix

use crate::artifacts::ArtifactStore;
use crate::builder::build_configuration;
use crate::context::{absolutize, ExecutionContext};
use crate::error::Result;
use crate::executor::CommandExecutor;
use crate::runner::run_configuration;
use crate::selector::Selection;
use crate::session::Session;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

pub const DEFAULT_TMP_DIR: &str = "tmp";

/// Knobs that apply to the whole invocation
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Repetitions per benchmark; zero builds but never runs
    pub count: usize,
    pub verbose: bool,
    /// Artifact root, relative to the execution context
    pub tmp_dir: PathBuf,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            count: 1,
            verbose: false,
            tmp_dir: PathBuf::from(DEFAULT_TMP_DIR),
        }
    }
}

/// What a successful invocation did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub configurations: usize,
    pub binaries_built: usize,
    pub invocations: usize,
    pub profiles_merged: usize,
}

pub struct Orchestrator {
    executor: Arc<dyn CommandExecutor>,
    context: ExecutionContext,
    options: RunOptions,
}

impl Orchestrator {
    pub fn new(
        executor: Arc<dyn CommandExecutor>,
        context: ExecutionContext,
        options: RunOptions,
    ) -> Self {
        Self {
            executor,
            context,
            options,
        }
    }

    /// Absolute artifact root for this invocation.
    pub fn tmp_root(&self) -> PathBuf {
        absolutize(&self.options.tmp_dir, &self.context.working_dir)
    }

    /// Build then run every active configuration in declaration order.
    ///
    /// Stops at the first error; artifacts produced so far stay on disk.
    pub async fn run(&self, selection: &Selection) -> Result<RunSummary> {
        let store = ArtifactStore::open(self.tmp_root())?;
        let session = Session {
            store: &store,
            executor: self.executor.as_ref(),
            context: &self.context,
            verbose: self.options.verbose,
        };

        let mut summary = RunSummary::default();
        for config in selection.active_configurations() {
            summary.binaries_built +=
                build_configuration(&session, config, &selection.benchmarks).await?;
            let tally =
                run_configuration(&session, config, &selection.benchmarks, self.options.count)
                    .await?;
            summary.invocations += tally.invocations;
            summary.profiles_merged += tally.profiles_merged;
            summary.configurations += 1;
        }

        info!(
            configurations = summary.configurations,
            binaries = summary.binaries_built,
            runs = summary.invocations,
            profiles = summary.profiles_merged,
            "benchmark matrix complete"
        );
        Ok(summary)
    }
}

/// Surface the selector's warnings to the operator.
pub fn log_warnings(selection: &Selection) {
    for warning in &selection.warnings {
        warn!("{}", warning);
    }
}
