// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dataset and manifestation types.
//!
//! A `Dataset` exists independently of any container and outlives it; a
//! `Manifestation` is a local, concrete instance of a dataset on one node.
//! At most one node may hold the primary manifestation of a given
//! `dataset_id` at any instant — this invariant is enforced by the
//! analyzer (`crate::dataset_changes`), not by this module; this module
//! just carries the `primary` flag as data.

use crate::id::DatasetId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The storage-pool-facing namespace this crate uses for all datasets.
///
/// Real multi-tenant namespacing is deliberately out of scope; every
/// dataset lives in this one namespace, matching the upstream system's own
/// deferred-namespace placeholder.
pub const DEFAULT_NAMESPACE: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dataset {
    pub dataset_id: DatasetId,
    /// Maximum size in bytes. `None` means unbounded.
    pub maximum_size: Option<u64>,
    /// Unordered string metadata. Never compared when deciding whether a
    /// running application's volume spec has drifted (see
    /// `Application::normalized_for_comparison`).
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub deleted: bool,
}

impl Dataset {
    pub fn new(dataset_id: impl Into<DatasetId>) -> Self {
        Self { dataset_id: dataset_id.into(), maximum_size: None, metadata: BTreeMap::new(), deleted: false }
    }

    pub fn with_maximum_size(mut self, size: u64) -> Self {
        self.maximum_size = Some(size);
        self
    }

    pub fn deleted(mut self) -> Self {
        self.deleted = true;
        self
    }

    /// The fully-qualified volume name a `StoragePool` implementation sees:
    /// `"{namespace}.{dataset_id}"`.
    pub fn volume_name(&self) -> String {
        format!("{}.{}", DEFAULT_NAMESPACE, self.dataset_id.as_str())
    }
}

/// A local, concrete instance of a `Dataset` on a specific node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifestation {
    pub dataset: Dataset,
    /// Whether this node holds authoritative, mutable access. At most one
    /// node's manifestation of a given `dataset_id` may be primary.
    pub primary: bool,
}

impl Manifestation {
    pub fn primary(dataset: Dataset) -> Self {
        Self { dataset, primary: true }
    }

    pub fn dataset_id(&self) -> &DatasetId {
        &self.dataset.dataset_id
    }
}

/// Binds a `Manifestation` to a mountpoint inside a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedVolume {
    pub manifestation: Manifestation,
    pub mountpoint: String,
}

#[cfg(test)]
#[path = "dataset_tests.rs"]
mod tests;
