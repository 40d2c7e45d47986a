//! Layout of the temporary directory that holds binaries and profiles
//!
//! ```text
//! <root>/<config>/<bench>                              built test binary
//! <root>/<config>/profiles/<bench>.pprof               merged profile
//! <root>/<config>/profiles/_<bench>/<bench>_<i>.pprof  one profile per repetition
//! ```
//!
//! The per-repetition directory only lives for the run phase of one benchmark.

use crate::error::{BenchError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory under each configuration holding its profiles
pub const PROFILES_DIR: &str = "profiles";
const PROFILE_EXT: &str = "pprof";

pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Create (if absent) the artifact root. `root` should already be absolute.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        ensure_dir(&root)?;
        Ok(Self { root })
    }

    pub fn config_dir(&self, config: &str) -> PathBuf {
        self.root.join(config)
    }

    pub fn binary_path(&self, config: &str, bench: &str) -> PathBuf {
        self.config_dir(config).join(bench)
    }

    pub fn profiles_dir(&self, config: &str) -> PathBuf {
        self.config_dir(config).join(PROFILES_DIR)
    }

    pub fn merged_profile(&self, config: &str, bench: &str) -> PathBuf {
        self.profiles_dir(config)
            .join(format!("{}.{}", bench, PROFILE_EXT))
    }

    pub fn repetition_dir(&self, config: &str, bench: &str) -> PathBuf {
        self.profiles_dir(config).join(format!("_{}", bench))
    }

    pub fn repetition_profile(&self, config: &str, bench: &str, repetition: usize) -> PathBuf {
        self.repetition_dir(config, bench)
            .join(format!("{}_{}.{}", bench, repetition, PROFILE_EXT))
    }

    /// Profiles written by repetitions `0..count`, in run order.
    pub fn repetition_profiles(&self, config: &str, bench: &str, count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| self.repetition_profile(config, bench, i))
            .collect()
    }
}

/// Create a directory and its parents if needed.
pub fn ensure_dir(path: &Path) -> Result<PathBuf> {
    fs::create_dir_all(path).map_err(|e| BenchError::io(path, e))?;
    Ok(path.to_path_buf())
}

/// Recreate a directory empty.
pub fn reset_dir(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(|e| BenchError::io(path, e))?;
    }
    ensure_dir(path)
}

/// Remove a directory with its contents; a missing directory is not an error.
pub fn remove_dir(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(BenchError::io(path, e)),
    }
}
