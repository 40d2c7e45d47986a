//! Build stage: one test binary per active benchmark

use crate::artifacts::ensure_dir;
use crate::config::{Benchmark, Configuration};
use crate::error::{BenchError, Result};
use crate::session::Session;
use crate::toolchain::Toolchain;
use std::io;
use tracing::{debug, info};

/// Build every enabled benchmark for `config`. Returns how many binaries were built.
///
/// The first failing build aborts the stage.
pub async fn build_configuration(
    session: &Session<'_>,
    config: &Configuration,
    benchmarks: &[Benchmark],
) -> Result<usize> {
    let store = session.store;
    ensure_dir(&store.config_dir(&config.name))?;
    let toolchain = Toolchain::for_configuration(config, session.context);

    // The consumed profiles live in the source configuration's tree.
    if let Some(source) = config.profile_source() {
        ensure_dir(&store.profiles_dir(source))?;
    }

    info!("Building benchmarks for configuration '{}'...", config.name);

    let mut built = 0;
    for bench in benchmarks.iter().filter(|b| !b.disabled) {
        let source_dir = session.context.resolve(&bench.dir);
        if !source_dir.is_dir() {
            return Err(BenchError::io(
                &source_dir,
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("source directory of benchmark '{}' does not exist", bench.name),
                ),
            ));
        }

        let profile = config
            .profile_source()
            .map(|source| store.merged_profile(source, &bench.name));
        let output = store.binary_path(&config.name, &bench.name);
        let cmd = toolchain.build_command(config, &source_dir, &output, profile.as_deref())?;

        debug!(
            configuration = %config.name,
            benchmark = %bench.name,
            pgo = profile.is_some(),
            "building"
        );
        session.announce(&cmd);
        session.execute(&cmd).await?;
        built += 1;
    }

    Ok(built)
}
