//! Explicit execution context for external commands
//!
//! Commands never rely on the process working directory: each one carries
//! the directory it runs in and the environment entries layered on top of
//! the inherited environment.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::error::{BenchError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    pub working_dir: PathBuf,
    /// Added to (and overriding) the inherited environment, in order
    pub env: Vec<(String, String)>,
}

impl ExecutionContext {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            env: Vec::new(),
        }
    }

    /// Context rooted at the directory the process was started in.
    pub fn from_current_dir() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| BenchError::io(".", e))?;
        Ok(Self::new(cwd))
    }

    pub fn with_env(mut self, env: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env.extend(env);
        self
    }

    /// Expand `$VAR`/`${VAR}` and make the result absolute against this context.
    pub fn resolve(&self, path: &str) -> PathBuf {
        absolutize(Path::new(&expand_env(path)), &self.working_dir)
    }
}

/// Expand environment references; unset variables expand to nothing.
pub fn expand_env(input: &str) -> String {
    expand_with(input, |name| std::env::var(name).ok())
}

pub fn expand_with<F>(input: &str, mut lookup: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    shellexpand::env_with_context_no_errors(input, |name| Some(lookup(name).unwrap_or_default()))
        .into_owned()
}

/// Join `path` onto `base` unless already absolute, then drop `.` and `..` lexically.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    let mut clean = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !clean.pop() {
                    clean.push(component);
                }
            }
            other => clean.push(other),
        }
    }
    clean
}

/// Where a command's standard output goes; stderr always reaches the console
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StdoutTarget {
    Inherit,
    /// Truncate-create this file and write stdout into it
    File(PathBuf),
}

/// A fully-resolved external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub context: ExecutionContext,
    pub stdout: StdoutTarget,
    /// The program is a run wrapper around the real binary
    pub wrapped: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>, context: ExecutionContext) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            context,
            stdout: StdoutTarget::Inherit,
            wrapped: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdout_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout = StdoutTarget::File(path.into());
        self
    }

    pub fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    /// Value of the first `<prefix><value>` argument.
    pub fn arg_value(&self, prefix: &str) -> Option<&str> {
        self.args.iter().find_map(|a| a.strip_prefix(prefix))
    }
}

impl fmt::Display for CommandSpec {
    /// Shell-like rendering with the environment prefix, as echoed in verbose mode.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.context.env {
            write!(f, "{}={} ", key, value)?;
        }
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
