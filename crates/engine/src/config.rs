// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A node's runtime configuration: state directory, poll interval, and
//! anything else the driver needs besides the `NodeIdentity` it loads
//! alongside this file. Read from a small `toml` file, with serde-derived
//! defaults for anything absent, following the same override-precedence
//! shape (`load`'s caller resolves the directory the same way
//! `convergence_core::identity::state_dir` resolves its own).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const CONFIG_FILE: &str = "engine.toml";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read engine config at {path}: {source}")]
    Read { path: PathBuf, #[source] source: std::io::Error },
    #[error("engine config at {path} is malformed: {source}")]
    Malformed { path: PathBuf, #[source] source: toml::de::Error },
}

/// Node-local engine settings, persisted as TOML alongside `NodeIdentity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub poll_interval_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS }
    }
}

impl EngineConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Load `{state_dir}/engine.toml`. A missing file is not an error —
    /// it just means defaults apply, mirroring `NodeIdentity::load_or_create`'s
    /// first-start behavior without needing to write anything back.
    pub fn load(state_dir: &Path) -> Result<Self, ConfigError> {
        let path = state_dir.join(CONFIG_FILE);
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                toml::from_str(&contents).map_err(|source| ConfigError::Malformed { path, source })
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
