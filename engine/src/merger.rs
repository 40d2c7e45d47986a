//! Merge stage: fold per-repetition CPU profiles into one PGO profile

use crate::artifacts::remove_dir;
use crate::config::{Benchmark, Configuration};
use crate::error::Result;
use crate::session::Session;
use crate::toolchain::Toolchain;
use std::path::PathBuf;
use tracing::debug;

/// Merge the `count` repetition profiles of `bench` into
/// `<config>/profiles/<bench>.pprof`, then delete the repetition directory.
///
/// An existing merged profile is overwritten. On failure the repetition
/// directory is left in place.
pub async fn merge_profiles(
    session: &Session<'_>,
    config: &Configuration,
    bench: &Benchmark,
    count: usize,
) -> Result<PathBuf> {
    let store = session.store;
    let toolchain = Toolchain::for_configuration(config, session.context);
    let inputs = store.repetition_profiles(&config.name, &bench.name, count);
    let output = store.merged_profile(&config.name, &bench.name);

    let cmd = toolchain.merge_command(&store.config_dir(&config.name), &inputs, &output);
    debug!(
        configuration = %config.name,
        benchmark = %bench.name,
        inputs = inputs.len(),
        "merging profiles"
    );
    session.announce(&cmd);
    session.execute(&cmd).await?;

    remove_dir(&store.repetition_dir(&config.name, &bench.name))?;
    Ok(output)
}
