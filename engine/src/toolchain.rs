//! Command lines understood by a Go toolchain and Go test binaries

use crate::config::Configuration;
use crate::context::{CommandSpec, ExecutionContext};
use crate::error::Result;
use std::path::{Path, PathBuf};

pub const GOROOT_VAR: &str = "GOROOT";

/// A Go installation rooted at an absolute path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    root: PathBuf,
}

impl Toolchain {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Toolchain named by `config.root`, expanded and resolved against `ctx`.
    pub fn for_configuration(config: &Configuration, ctx: &ExecutionContext) -> Self {
        Self::new(ctx.resolve(&config.root))
    }

    pub fn go(&self) -> PathBuf {
        self.root.join("bin").join("go")
    }

    /// `go test -c -a` for the package in `source_dir`, writing the test binary to `output`.
    pub fn build_command(
        &self,
        config: &Configuration,
        source_dir: &Path,
        output: &Path,
        profile: Option<&Path>,
    ) -> Result<CommandSpec> {
        let ctx = ExecutionContext::new(source_dir)
            .with_env(config.build_env()?)
            .with_env([(GOROOT_VAR.to_string(), self.root.display().to_string())]);

        let mut cmd = CommandSpec::new(self.go(), ctx)
            .args(["test", "-c", "-a"])
            .arg(format!("-gcflags=all={}", config.gc_flags))
            .arg(format!("-ldflags=all={}", config.ld_flags))
            .args(config.build_flags.iter().cloned());
        if let Some(profile) = profile {
            cmd = cmd.arg(format!("-pgo={}", profile.display()));
        }
        Ok(cmd.arg("-o").arg(output.display().to_string()))
    }

    /// `go tool pprof -proto <profiles...>` with stdout captured into `output`.
    pub fn merge_command(&self, working_dir: &Path, profiles: &[PathBuf], output: &Path) -> CommandSpec {
        CommandSpec::new(self.go(), ExecutionContext::new(working_dir))
            .args(["tool", "pprof", "-proto"])
            .args(profiles.iter().map(|p| p.display().to_string()))
            .stdout_to(output)
    }
}

/// Test binary flag selecting benchmark functions.
pub fn bench_flag(filter: &str) -> String {
    format!("-test.bench={}", filter)
}

/// Test binary flag writing a CPU profile.
pub fn cpuprofile_flag(path: &Path) -> String {
    format!("-test.cpuprofile={}", path.display())
}
