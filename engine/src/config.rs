//! Configuration and benchmark descriptors, and the TOML files they come from

use crate::error::{BenchError, Result};
use serde::{Deserialize, Deserializer};
use std::path::Path;

/// Filter used when a benchmark does not name one; matches every Go benchmark function.
pub const DEFAULT_BENCHMARK_FILTER: &str = "Benchmark";

/// A named toolchain/build/run profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Configuration {
    /// Short name used for artifact directories and allowlists
    pub name: String,
    /// Go root of the toolchain under test; `$VAR` references are expanded
    pub root: String,
    /// Collect a CPU profile on every run and merge them per benchmark
    pub pgo_gen: bool,
    /// Name of the configuration whose merged profiles feed this build
    pub pgo_use: String,
    /// Extra flags appended to `go test -c`
    pub build_flags: Vec<String>,
    #[serde(deserialize_with = "flag_string")]
    pub gc_flags: String,
    #[serde(deserialize_with = "flag_string")]
    pub ld_flags: String,
    /// `KEY=VALUE` entries added to the build environment
    pub gc_env: Vec<String>,
    /// Extra flags passed to every benchmark binary
    pub run_flags: Vec<String>,
    /// `KEY=VALUE` entries added to the run environment
    pub run_env: Vec<String>,
    /// Command and leading args that wrap each benchmark binary
    pub run_wrapper: Vec<String>,
    pub disabled: bool,
}

impl Configuration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Configuration whose profiles this one consumes, if any.
    pub fn profile_source(&self) -> Option<&str> {
        if self.pgo_use.is_empty() {
            None
        } else {
            Some(&self.pgo_use)
        }
    }

    pub fn build_env(&self) -> Result<Vec<(String, String)>> {
        parse_env_entries(&self.name, "GcEnv", &self.gc_env)
    }

    pub fn run_env(&self) -> Result<Vec<(String, String)>> {
        parse_env_entries(&self.name, "RunEnv", &self.run_env)
    }
}

/// A named benchmark target
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Benchmark {
    pub name: String,
    /// Regex handed to `-test.bench=`
    #[serde(rename = "Benchmarks")]
    pub filter: String,
    /// Package directory holding the `_test.go` files
    pub dir: String,
    pub run_flags: Vec<String>,
    pub disabled: bool,
}

impl Benchmark {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Contents of a configurations file (`[[Configurations]]` tables)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ConfigurationList {
    pub configurations: Vec<Configuration>,
}

/// Contents of a benchmarks file (`[[Benchmarks]]` tables)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BenchmarkList {
    pub benchmarks: Vec<Benchmark>,
}

impl ConfigurationList {
    /// Load configurations from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_toml(path.as_ref())
    }
}

impl BenchmarkList {
    /// Load benchmarks from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_toml(path.as_ref())
    }
}

fn load_toml<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| BenchError::io(path, e))?;
    toml::from_str(&content).map_err(|source| BenchError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagField {
    One(String),
    Many(Vec<String>),
}

// GcFlags/LdFlags are a single string on the go command line; lists are joined.
fn flag_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(match FlagField::deserialize(deserializer)? {
        FlagField::One(flags) => flags,
        FlagField::Many(flags) => flags.join(" "),
    })
}

/// Split `KEY=VALUE` entries into pairs, rejecting anything without a key.
pub fn parse_env_entries(
    owner: &str,
    field: &str,
    entries: &[String],
) -> Result<Vec<(String, String)>> {
    entries
        .iter()
        .map(|entry| match entry.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
            _ => Err(BenchError::Validation(format!(
                "{} entry '{}' of configuration '{}' is not of the form KEY=VALUE",
                field, entry, owner
            ))),
        })
        .collect()
}
