// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node identity: a small persisted UUID this node uses to address itself
//! and to recognize its own writes when discovering cluster state.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

const IDENTITY_FILE: &str = "node-identity.json";
const IDENTITY_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("failed to read node identity at {path}: {source}")]
    Read { path: PathBuf, #[source] source: std::io::Error },
    #[error("failed to write node identity at {path}: {source}")]
    Write { path: PathBuf, #[source] source: std::io::Error },
    #[error("node identity at {path} is corrupt: {source}")]
    Corrupt { path: PathBuf, #[source] source: serde_json::Error },
    #[error("node identity at {path} has unsupported version {found} (expected {expected})")]
    UnsupportedVersion { path: PathBuf, found: u32, expected: u32 },
}

/// A node's cluster-wide stable identity, persisted as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeIdentity {
    pub version: u32,
    pub uuid: String,
}

impl NodeIdentity {
    fn generate() -> Self {
        Self { version: IDENTITY_VERSION, uuid: Uuid::new_v4().to_string() }
    }

    /// Load the identity from `{state_dir}/node-identity.json`, creating one
    /// with a fresh random uuid on first start.
    pub fn load_or_create(state_dir: &Path) -> Result<Self, IdentityError> {
        let path = state_dir.join(IDENTITY_FILE);
        match fs::read_to_string(&path) {
            Ok(contents) => {
                let identity: NodeIdentity = serde_json::from_str(&contents)
                    .map_err(|source| IdentityError::Corrupt { path: path.clone(), source })?;
                if identity.version != IDENTITY_VERSION {
                    return Err(IdentityError::UnsupportedVersion {
                        path,
                        found: identity.version,
                        expected: IDENTITY_VERSION,
                    });
                }
                Ok(identity)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let identity = Self::generate();
                identity.persist(state_dir)?;
                Ok(identity)
            }
            Err(source) => Err(IdentityError::Read { path, source }),
        }
    }

    fn persist(&self, state_dir: &Path) -> Result<(), IdentityError> {
        fs::create_dir_all(state_dir)
            .map_err(|source| IdentityError::Write { path: state_dir.to_path_buf(), source })?;
        let path = state_dir.join(IDENTITY_FILE);
        let contents = serde_json::to_string_pretty(self).expect("NodeIdentity always serializes");
        fs::write(&path, contents).map_err(|source| IdentityError::Write { path, source })
    }
}

/// Resolve the state directory: `CONVERGENCE_STATE_DIR` overrides everything;
/// otherwise fall back to the platform state directory (`dirs::state_dir()`,
/// then `dirs::home_dir().join(".local/state")`, then `/tmp` as a last
/// resort), joined with `"convergence"`.
pub fn state_dir() -> Result<PathBuf, IdentityError> {
    if let Ok(dir) = std::env::var("CONVERGENCE_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let base = dirs::state_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".local/state")))
        .unwrap_or_else(|| PathBuf::from("/tmp"));
    Ok(base.join("convergence"))
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
