// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ContainerRuntime`: the capability interface the application deployer
//! uses to list, start, and stop units. Ships only the in-memory reference
//! implementation described in the interface contract; a real Docker or
//! Kubernetes client is an external collaborator outside this crate.

use async_trait::async_trait;
use convergence_core::application::RestartPolicy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("no such unit: {0}")]
    NoSuchUnit(String),
    #[error("unit already exists: {0}")]
    NameCollision(String),
    #[error("image rejected: {0}")]
    ImageRejected(String),
    #[error("volume path missing: {0}")]
    VolumePathMissing(String),
}

/// A declared container to bring up. Mirrors `convergence_core::Application`
/// but flattens the volume down to the container-visible mountpoint, since
/// the runtime itself has no notion of `Dataset`/`Manifestation`.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub ports: Vec<(u16, u16)>,
    pub volume: Option<VolumeBinding>,
    pub environment: Vec<(String, String)>,
    pub memory_limit: Option<u64>,
    pub cpu_shares: Option<u32>,
    pub restart_policy: RestartPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VolumeBinding {
    pub container_path: String,
    pub node_path: String,
}

/// An observed unit as the runtime reports it.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub name: String,
    pub image: String,
    pub volume: Option<VolumeBinding>,
    pub ports: Vec<(u16, u16)>,
    pub environment: Vec<(String, String)>,
    pub memory_limit: Option<u64>,
    pub cpu_shares: Option<u32>,
    pub restart_policy: RestartPolicy,
    pub active: bool,
}

#[async_trait]
pub trait ContainerRuntime: Send + Sync + 'static {
    async fn list(&self) -> Result<Vec<Unit>, RuntimeError>;
    async fn add(&self, spec: ContainerSpec) -> Result<(), RuntimeError>;
    async fn remove(&self, name: &str) -> Result<(), RuntimeError>;
}

/// In-memory reference runtime: the only `ContainerRuntime` this crate
/// ships. Adequate for single-node smoke runs and the full test suite; a
/// real Docker/Kubernetes client is out of scope (see interface contract).
#[derive(Clone, Default)]
pub struct InMemoryContainerRuntime {
    units: Arc<Mutex<HashMap<String, Unit>>>,
}

impl InMemoryContainerRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a unit inactive without removing it, simulating a crashed
    /// container the next discovery pass should see as `running=false`.
    pub fn mark_inactive(&self, name: &str) {
        if let Some(unit) = self.units.lock().get_mut(name) {
            unit.active = false;
        }
    }
}

#[async_trait]
impl ContainerRuntime for InMemoryContainerRuntime {
    async fn list(&self) -> Result<Vec<Unit>, RuntimeError> {
        Ok(self.units.lock().values().cloned().collect())
    }

    async fn add(&self, spec: ContainerSpec) -> Result<(), RuntimeError> {
        if spec.image.is_empty() {
            return Err(RuntimeError::ImageRejected(spec.name));
        }
        let mut units = self.units.lock();
        if units.contains_key(&spec.name) {
            return Err(RuntimeError::NameCollision(spec.name));
        }
        units.insert(
            spec.name.clone(),
            Unit {
                name: spec.name,
                image: spec.image,
                volume: spec.volume,
                ports: spec.ports,
                environment: spec.environment,
                memory_limit: spec.memory_limit,
                cpu_shares: spec.cpu_shares,
                restart_policy: spec.restart_policy,
                active: true,
            },
        );
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), RuntimeError> {
        // Absence is not a failure, per the primitive's documented contract.
        self.units.lock().remove(name);
        Ok(())
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
