//! Run stage: execute each built benchmark `count` times

use crate::artifacts::{ensure_dir, reset_dir, ArtifactStore};
use crate::config::{Benchmark, Configuration};
use crate::context::{CommandSpec, ExecutionContext};
use crate::error::Result;
use crate::merger::merge_profiles;
use crate::session::Session;
use crate::toolchain::{bench_flag, cpuprofile_flag};
use tracing::{debug, info};

/// What the run stage did for one configuration
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunTally {
    pub invocations: usize,
    pub profiles_merged: usize,
}

pub async fn run_configuration(
    session: &Session<'_>,
    config: &Configuration,
    benchmarks: &[Benchmark],
    count: usize,
) -> Result<RunTally> {
    let store = session.store;
    let bin_dir = ensure_dir(&store.config_dir(&config.name))?;
    if config.pgo_gen {
        ensure_dir(&store.profiles_dir(&config.name))?;
    }
    let run_ctx = ExecutionContext::new(&bin_dir).with_env(config.run_env()?);

    info!("Running benchmarks for configuration '{}'...", config.name);

    let mut tally = RunTally::default();
    for bench in benchmarks.iter().filter(|b| !b.disabled) {
        if config.pgo_gen {
            reset_dir(&store.repetition_dir(&config.name, &bench.name))?;
        }

        for repetition in 0..count {
            let cmd = run_command(store, config, bench, &run_ctx, repetition);
            debug!(
                configuration = %config.name,
                benchmark = %bench.name,
                repetition,
                "running"
            );
            session.announce(&cmd);
            println!("shortname: {}\ntoolchain: {}", bench.name, config.name);
            session.execute(&cmd).await?;
            tally.invocations += 1;
        }

        // With count == 0 the freshly reset repetition directory stays behind.
        if config.pgo_gen && count > 0 {
            merge_profiles(session, config, bench, count).await?;
            tally.profiles_merged += 1;
        }
    }

    Ok(tally)
}

/// The invocation for one repetition of `bench` under `config`.
///
/// Argument order is fixed: filter, configuration flags, benchmark flags, so a
/// benchmark can override its configuration. A run wrapper becomes the program
/// and receives the binary path after its own arguments.
pub fn run_command(
    store: &ArtifactStore,
    config: &Configuration,
    bench: &Benchmark,
    ctx: &ExecutionContext,
    repetition: usize,
) -> CommandSpec {
    let binary = store.binary_path(&config.name, &bench.name);

    let mut cmd = match config.run_wrapper.split_first() {
        Some((wrapper, wrapper_args)) => {
            let mut cmd = CommandSpec::new(wrapper, ctx.clone())
                .args(wrapper_args.iter().cloned())
                .arg(binary.display().to_string());
            cmd.wrapped = true;
            cmd
        }
        None => CommandSpec::new(binary, ctx.clone()),
    };

    cmd = cmd
        .arg(bench_flag(&bench.filter))
        .args(config.run_flags.iter().cloned())
        .args(bench.run_flags.iter().cloned());

    if config.pgo_gen {
        let profile = store.repetition_profile(&config.name, &bench.name, repetition);
        cmd = cmd.arg(cpuprofile_flag(&profile));
    }
    cmd
}
