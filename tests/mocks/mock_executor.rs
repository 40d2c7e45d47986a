use async_trait::async_trait;
use benchmatrix_engine::{BenchError, CommandExecutor, CommandSpec, Result, StdoutTarget};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Which toolchain operation a recorded command represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Build,
    Run,
    Merge,
}

impl CommandKind {
    pub fn of(command: &CommandSpec) -> Self {
        match command.args.first().map(String::as_str) {
            Some("test") if command.args.get(1).map(String::as_str) == Some("-c") => {
                CommandKind::Build
            }
            Some("tool") if command.args.get(1).map(String::as_str) == Some("pprof") => {
                CommandKind::Merge
            }
            _ => CommandKind::Run,
        }
    }
}

type FailureRule = Box<dyn Fn(&CommandSpec) -> bool + Send + Sync>;

/// Stand-in for the process table.
///
/// Every command is recorded. Builds write a binary whose contents are the
/// rendered command line, runs write their `-test.cpuprofile` file, merges
/// concatenate their inputs into the redirected stdout file.
#[derive(Default)]
pub struct MockExecutor {
    calls: Mutex<Vec<CommandSpec>>,
    failures: Mutex<Vec<FailureRule>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make matching commands exit nonzero.
    pub fn fail_when<F>(&self, rule: F)
    where
        F: Fn(&CommandSpec) -> bool + Send + Sync + 'static,
    {
        self.failures.lock().unwrap().push(Box::new(rule));
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_of(&self, kind: CommandKind) -> Vec<CommandSpec> {
        self.calls()
            .into_iter()
            .filter(|c| CommandKind::of(c) == kind)
            .collect()
    }

    fn should_fail(&self, command: &CommandSpec) -> bool {
        self.failures.lock().unwrap().iter().any(|rule| rule(command))
    }
}

#[async_trait]
impl CommandExecutor for MockExecutor {
    async fn execute(&self, command: &CommandSpec) -> Result<()> {
        self.calls.lock().unwrap().push(command.clone());

        if !command.context.working_dir.is_dir() {
            return Err(BenchError::Spawn {
                program: command.program_name(),
                wrapper: command.wrapped,
                source: io::Error::from(io::ErrorKind::NotFound),
            });
        }

        // Redirected stdout is created before the process starts, as a real spawn would.
        if let StdoutTarget::File(path) = &command.stdout {
            std::fs::File::create(path).map_err(|e| BenchError::io(path, e))?;
        }

        if self.should_fail(command) {
            return Err(BenchError::CommandFailed {
                program: command.program_name(),
                status: "exit status: 1".to_string(),
            });
        }

        match CommandKind::of(command) {
            CommandKind::Build => fake_build(command),
            CommandKind::Run => fake_run(command),
            CommandKind::Merge => fake_merge(command),
        }
    }
}

fn fake_build(command: &CommandSpec) -> Result<()> {
    let output = command
        .args
        .iter()
        .position(|a| a == "-o")
        .and_then(|i| command.args.get(i + 1))
        .map(PathBuf::from)
        .ok_or_else(|| failed(command, "build without -o"))?;
    write(&output, command.to_string().as_bytes())
}

fn fake_run(command: &CommandSpec) -> Result<()> {
    let binary = if command.wrapped {
        command
            .args
            .iter()
            .map(Path::new)
            .find(|a| a.is_absolute())
            .map(Path::to_path_buf)
    } else {
        Some(command.program.clone())
    };
    match binary {
        Some(binary) if binary.is_file() => {}
        _ => return Err(failed(command, "test binary was never built")),
    }

    if let Some(profile) = command.arg_value("-test.cpuprofile=") {
        write(Path::new(profile), format!("cpu {}\n", profile).as_bytes())?;
    }
    Ok(())
}

fn fake_merge(command: &CommandSpec) -> Result<()> {
    let output = match &command.stdout {
        StdoutTarget::File(path) => path.clone(),
        StdoutTarget::Inherit => return Err(failed(command, "merge output not redirected")),
    };
    let mut merged = Vec::new();
    for input in command.args.iter().skip(3) {
        let bytes = std::fs::read(input).map_err(|e| BenchError::io(input, e))?;
        merged.extend(bytes);
    }
    write(&output, &merged)
}

fn write(path: &Path, contents: &[u8]) -> Result<()> {
    std::fs::write(path, contents).map_err(|e| BenchError::io(path, e))
}

fn failed(command: &CommandSpec, why: &str) -> BenchError {
    BenchError::CommandFailed {
        program: command.program_name(),
        status: why.to_string(),
    }
}
