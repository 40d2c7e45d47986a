//! State shared by the build, run and merge stages of one invocation

use crate::artifacts::ArtifactStore;
use crate::context::{CommandSpec, ExecutionContext};
use crate::executor::CommandExecutor;
use crate::error::Result;

pub struct Session<'a> {
    pub store: &'a ArtifactStore,
    pub executor: &'a dyn CommandExecutor,
    /// Directory the invocation started in; relative inputs resolve against it
    pub context: &'a ExecutionContext,
    /// Echo each command line before running it
    pub verbose: bool,
}

impl<'a> Session<'a> {
    /// Print what is about to run. Output goes to stdout, interleaved with the
    /// commands' own output.
    pub fn announce(&self, command: &CommandSpec) {
        if self.verbose {
            println!("( cd {} )", command.context.working_dir.display());
            println!("( {} )", command);
        }
        println!();
    }

    pub async fn execute(&self, command: &CommandSpec) -> Result<()> {
        self.executor.execute(command).await
    }
}
