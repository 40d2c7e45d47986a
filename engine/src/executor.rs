//! The seam between the engine and the operating system's process table

use crate::context::{CommandSpec, StdoutTarget};
use crate::error::{BenchError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tracing::debug;

/// Runs one external command to completion.
///
/// Implementations must not return before the process has exited, and must
/// treat a nonzero exit as an error.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, command: &CommandSpec) -> Result<()>;
}

/// Spawns real processes with `tokio::process`
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExecutor;

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn execute(&self, spec: &CommandSpec) -> Result<()> {
        let mut cmd = tokio::process::Command::new(&spec.program);
        cmd.args(&spec.args)
            .current_dir(&spec.context.working_dir)
            .envs(spec.context.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::inherit())
            .stderr(Stdio::inherit());

        match &spec.stdout {
            StdoutTarget::Inherit => {
                cmd.stdout(Stdio::inherit());
            }
            StdoutTarget::File(path) => {
                let file = std::fs::File::create(path).map_err(|e| BenchError::io(path, e))?;
                cmd.stdout(Stdio::from(file));
            }
        }

        debug!(
            program = %spec.program.display(),
            cwd = %spec.context.working_dir.display(),
            args = spec.args.len(),
            "spawning"
        );

        let status = cmd.status().await.map_err(|source| BenchError::Spawn {
            program: spec.program_name(),
            wrapper: spec.wrapped,
            source,
        })?;

        if !status.success() {
            return Err(BenchError::CommandFailed {
                program: spec.program_name(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}
