// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dataset-change analyzer: a pure function comparing current and
//! desired cluster state to produce the five dataset change sets that
//! drive the migration phases of the convergence plan.

use crate::dataset::Dataset;
use crate::id::{DatasetId, Hostname};
use crate::node::{Deployment, DeploymentState};
use std::collections::{BTreeMap, HashSet};

/// A dataset that needs to move from the local node to `hostname`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasetHandoff {
    pub dataset: Dataset,
    pub hostname: Hostname,
}

/// The five disjoint dataset change sets the planner turns into phases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetChanges {
    /// Doesn't exist anywhere yet; must be created locally.
    pub creating: HashSet<Dataset>,
    /// Exists locally and desired maximum_size differs from the current one.
    pub resizing: HashSet<Dataset>,
    /// Currently owned by a peer, desired locally: must migrate here.
    pub coming: HashSet<Dataset>,
    /// Currently owned locally, desired on a peer: must migrate away.
    pub going: HashSet<DatasetHandoff>,
    /// Marked `deleted` anywhere in desired state.
    pub deleting: HashSet<Dataset>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AnalyzerError {
    /// The analyzer would have placed the same dataset id in both `coming`
    /// and `going` — desired_state claims it is simultaneously moving to
    /// and away from this node. That can only mean desired_state is
    /// self-contradictory; refuse to guess which side is right.
    #[error("dataset {0} is both coming to and going from {1}: desired_state is contradictory")]
    ConflictingDatasetChange(DatasetId, Hostname),
}

/// Compare `current_state` and `desired_state` from the perspective of
/// `local_hostname` and produce the set of dataset-level changes needed.
///
/// Assumes mountpoints never change and that volumes are never added to or
/// removed from an existing application — only moved across nodes (ported
/// from the upstream planner's own documented assumptions).
pub fn find_dataset_changes(
    local_hostname: &Hostname,
    current_state: &DeploymentState,
    desired_state: &Deployment,
) -> Result<DatasetChanges, AnalyzerError> {
    let desired_datasets_by_host = datasets_by_host_desired(desired_state);
    let current_datasets_by_host = datasets_by_host_current(current_state);

    let local_desired: Vec<&Dataset> =
        desired_datasets_by_host.get(local_hostname).into_iter().flatten().collect();

    let local_current_ids: HashSet<DatasetId> = current_datasets_by_host
        .get(local_hostname)
        .into_iter()
        .flatten()
        .map(|d| d.dataset_id.clone())
        .collect();

    let mut remote_current_ids: HashSet<DatasetId> = HashSet::new();
    for (hostname, datasets) in &current_datasets_by_host {
        if hostname != local_hostname {
            remote_current_ids.extend(datasets.iter().map(|d| d.dataset_id.clone()));
        }
    }

    // resizing: locally-present datasets whose desired maximum_size (by
    // whoever desires them, not just the local node) differs from the
    // current local maximum_size. Resize happens on the current owner
    // before handoff, regardless of who ends up owning it next.
    let mut resizing: HashSet<Dataset> = HashSet::new();
    if let Some(current_local) = current_datasets_by_host.get(local_hostname) {
        let current_by_id: BTreeMap<&DatasetId, &Dataset> =
            current_local.iter().map(|d| (&d.dataset_id, d)).collect();
        for datasets in desired_datasets_by_host.values() {
            for desired in datasets {
                if let Some(current) = current_by_id.get(&desired.dataset_id) {
                    if local_current_ids.contains(&desired.dataset_id)
                        && current.maximum_size != desired.maximum_size
                    {
                        resizing.insert(desired.clone());
                    }
                }
            }
        }
    }

    // going: datasets desired elsewhere that are currently primary here.
    let mut going: HashSet<DatasetHandoff> = HashSet::new();
    for (hostname, datasets) in &desired_datasets_by_host {
        if hostname == local_hostname {
            continue;
        }
        for dataset in datasets {
            if local_current_ids.contains(&dataset.dataset_id) {
                going.insert(DatasetHandoff { dataset: dataset.clone(), hostname: hostname.clone() });
            }
        }
    }

    // coming: desired locally, currently primary on a peer.
    let coming: HashSet<Dataset> = local_desired
        .iter()
        .filter(|d| remote_current_ids.contains(&d.dataset_id))
        .map(|d| (*d).clone())
        .collect();

    for handoff in &going {
        if coming.iter().any(|d| d.dataset_id == handoff.dataset.dataset_id) {
            return Err(AnalyzerError::ConflictingDatasetChange(
                handoff.dataset.dataset_id.clone(),
                handoff.hostname.clone(),
            ));
        }
    }

    // creating: desired locally, doesn't exist anywhere yet.
    let creating: HashSet<Dataset> = local_desired
        .iter()
        .filter(|d| {
            !local_current_ids.contains(&d.dataset_id) && !remote_current_ids.contains(&d.dataset_id)
        })
        .map(|d| (*d).clone())
        .collect();

    // deleting: marked deleted anywhere in desired_state.
    let deleting: HashSet<Dataset> =
        desired_datasets_by_host.values().flatten().filter(|d| d.deleted).cloned().collect();

    Ok(DatasetChanges { creating, resizing, coming, going, deleting })
}

fn datasets_by_host_desired(deployment: &Deployment) -> BTreeMap<Hostname, Vec<Dataset>> {
    deployment
        .nodes
        .iter()
        .map(|node| {
            (node.hostname.clone(), node.manifestations.values().map(|m| m.dataset.clone()).collect())
        })
        .collect()
}

fn datasets_by_host_current(state: &DeploymentState) -> BTreeMap<Hostname, Vec<Dataset>> {
    state
        .nodes
        .iter()
        .map(|node| {
            let manifestations = node.manifestations_or_empty();
            (node.hostname.clone(), manifestations.into_values().map(|m| m.dataset).collect())
        })
        .collect()
}

#[cfg(test)]
#[path = "dataset_changes_tests.rs"]
mod tests;
