//! Decides which configurations and benchmarks take part in an invocation

use crate::artifacts::PROFILES_DIR;
use crate::config::{Benchmark, Configuration, DEFAULT_BENCHMARK_FILTER};
use crate::error::{BenchError, Result};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

/// Operator-supplied narrowing of the matrix
#[derive(Debug, Clone, Default)]
pub struct SelectionRequest {
    /// Comma-separated configuration names; empty keeps declared flags
    pub configurations: String,
    /// Comma-separated benchmark names; empty keeps declared flags
    pub benchmarks: String,
    /// Directory substituted for benchmarks that do not set `Dir`
    pub default_dir: PathBuf,
}

/// Something the operator should know about the resolved selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionWarning {
    DefaultDir { benchmark: String },
    PgoUseIgnored { configuration: String },
    UnknownName { kind: &'static str, name: String },
}

impl fmt::Display for SelectionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionWarning::DefaultDir { benchmark } => write!(
                f,
                "'Dir' is not set for benchmark '{}'. Use current directory.",
                benchmark
            ),
            SelectionWarning::PgoUseIgnored { configuration } => write!(
                f,
                "PgoGen is set for configuration '{}', ignore PgoUse.",
                configuration
            ),
            SelectionWarning::UnknownName { kind, name } => {
                write!(f, "no {} named '{}'", kind, name)
            }
        }
    }
}

/// Both tables with their disabled flags and defaults resolved
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub configurations: Vec<Configuration>,
    pub benchmarks: Vec<Benchmark>,
    pub warnings: Vec<SelectionWarning>,
}

impl Selection {
    pub fn active_configurations(&self) -> impl Iterator<Item = &Configuration> {
        self.configurations.iter().filter(|c| !c.disabled)
    }

    pub fn active_benchmarks(&self) -> impl Iterator<Item = &Benchmark> {
        self.benchmarks.iter().filter(|b| !b.disabled)
    }

    pub fn configuration(&self, name: &str) -> Option<&Configuration> {
        self.configurations.iter().find(|c| c.name == name)
    }
}

/// Resolve the active matrix. The inputs are left untouched.
pub fn select(
    configurations: &[Configuration],
    benchmarks: &[Benchmark],
    request: &SelectionRequest,
) -> Result<Selection> {
    validate_names(
        "configuration",
        configurations.iter().map(|c| c.name.as_str()),
        &[],
    )?;
    // Benchmark binaries live next to the configuration's profiles directory.
    validate_names(
        "benchmark",
        benchmarks.iter().map(|b| b.name.as_str()),
        &[PROFILES_DIR],
    )?;

    let mut warnings = Vec::new();

    let mut configurations = configurations.to_vec();
    if let Some(allowed) = parse_allowlist(&request.configurations) {
        warn_unknown(
            "configuration",
            &allowed,
            configurations.iter().map(|c| c.name.as_str()),
            &mut warnings,
        );
        for config in &mut configurations {
            config.disabled = !allowed.contains(config.name.as_str());
        }
    }

    let mut benchmarks = benchmarks.to_vec();
    if let Some(allowed) = parse_allowlist(&request.benchmarks) {
        warn_unknown(
            "benchmark",
            &allowed,
            benchmarks.iter().map(|b| b.name.as_str()),
            &mut warnings,
        );
        for bench in &mut benchmarks {
            bench.disabled = !allowed.contains(bench.name.as_str());
        }
    }

    for bench in benchmarks.iter_mut().filter(|b| !b.disabled) {
        if bench.dir.is_empty() {
            warnings.push(SelectionWarning::DefaultDir {
                benchmark: bench.name.clone(),
            });
            bench.dir = request.default_dir.to_string_lossy().into_owned();
        }
        if bench.filter.is_empty() {
            bench.filter = DEFAULT_BENCHMARK_FILTER.to_string();
        }
    }

    for config in configurations.iter_mut().filter(|c| !c.disabled) {
        if config.pgo_gen && !config.pgo_use.is_empty() {
            warnings.push(SelectionWarning::PgoUseIgnored {
                configuration: config.name.clone(),
            });
            config.pgo_use.clear();
        }
    }

    Ok(Selection {
        configurations,
        benchmarks,
        warnings,
    })
}

/// Names become single path components under the artifact root.
fn validate_names<'a>(
    kind: &'static str,
    names: impl Iterator<Item = &'a str>,
    reserved: &[&str],
) -> Result<()> {
    let mut seen = HashSet::new();
    for (index, name) in names.enumerate() {
        if name.is_empty() {
            return Err(BenchError::MissingName { kind, index });
        }
        if name == "." || name == ".." || name.contains(&['/', '\\'][..]) {
            return Err(BenchError::Validation(format!(
                "{} name '{}' must not be a path",
                kind, name
            )));
        }
        if reserved.contains(&name) {
            return Err(BenchError::Validation(format!(
                "{} name '{}' is reserved",
                kind, name
            )));
        }
        if !seen.insert(name) {
            return Err(BenchError::Validation(format!(
                "{} name '{}' is used more than once",
                kind, name
            )));
        }
    }
    Ok(())
}

/// `None` when no allowlist was given; empty tokens are skipped.
fn parse_allowlist(list: &str) -> Option<HashSet<&str>> {
    if list.is_empty() {
        return None;
    }
    Some(
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect(),
    )
}

fn warn_unknown<'a>(
    kind: &'static str,
    allowed: &HashSet<&str>,
    names: impl Iterator<Item = &'a str>,
    warnings: &mut Vec<SelectionWarning>,
) {
    let known: HashSet<&str> = names.collect();
    let mut unknown: Vec<&str> = allowed.difference(&known).copied().collect();
    unknown.sort_unstable();
    warnings.extend(unknown.into_iter().map(|name| SelectionWarning::UnknownName {
        kind,
        name: name.to_string(),
    }));
}
