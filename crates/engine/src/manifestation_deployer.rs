// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The manifestation deployer: discovers local volumes from the storage
//! pool and contributes dataset state to planning. Knows nothing about
//! containers.

use crate::driver::DiscoveryError;
use convergence_adapters::{Filesystem, StoragePool};
use convergence_core::dataset::{Dataset, DEFAULT_NAMESPACE};
use convergence_core::id::{DatasetId, Hostname};
use convergence_core::known::Known;
use convergence_core::node::NodeState;
use convergence_core::Manifestation;
use std::collections::BTreeMap;

/// Invert `Dataset::volume_name()`: strip the fixed `"default."` namespace
/// prefix this crate uses for every volume. A filesystem outside that
/// namespace isn't one of ours and is skipped rather than guessed at.
fn dataset_id_from_volume_name(name: &str) -> Option<DatasetId> {
    name.strip_prefix(DEFAULT_NAMESPACE).and_then(|rest| rest.strip_prefix('.')).map(DatasetId::new)
}

pub struct ManifestationDeployer<P> {
    hostname: Hostname,
    pool: P,
}

impl<P: StoragePool> ManifestationDeployer<P> {
    pub fn new(hostname: Hostname, pool: P) -> Self {
        Self { hostname, pool }
    }

    /// Enumerate filesystems in the storage pool, keep those owned by this
    /// node, and build `{dataset_id → Manifestation(primary=true)}` plus
    /// `{dataset_id → mount_path}`. Returns a partial reading: everything
    /// but `manifestations`/`paths` stays `Unknown`, since this deployer
    /// has no opinion on containers or ports.
    pub async fn discover_state(&self, _prior: &NodeState) -> Result<NodeState, DiscoveryError> {
        let filesystems = self.pool.enumerate().await?;

        let mut manifestations = BTreeMap::new();
        let mut paths = BTreeMap::new();
        for fs in filesystems.iter().filter(|fs| fs.owner == self.hostname.as_str()) {
            let Some(dataset_id) = dataset_id_from_volume_name(&fs.volume.0) else { continue };
            paths.insert(dataset_id.clone(), fs.path().to_string());
            manifestations.insert(dataset_id.clone(), Manifestation::primary(dataset_from(dataset_id, fs)));
        }

        let mut state = NodeState::unknown(self.hostname.clone());
        state.manifestations = Known::Known(manifestations);
        state.paths = Known::Known(paths);
        Ok(state)
    }
}

fn dataset_from(dataset_id: DatasetId, fs: &Filesystem) -> Dataset {
    // Observed state never carries metadata — only desired config does
    // (see `Application::normalized_for_comparison`), so metadata here is
    // always empty; the pool has no notion of it either.
    Dataset { dataset_id, maximum_size: fs.maximum_size, metadata: BTreeMap::new(), deleted: false }
}

#[cfg(test)]
#[path = "manifestation_deployer_tests.rs"]
mod tests;
