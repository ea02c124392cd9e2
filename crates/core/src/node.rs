// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node, NodeState, Deployment, and DeploymentState: the desired and
//! observed cluster snapshots the planner compares.

use crate::application::{Application, OpenPort, Proxy};
use crate::dataset::Manifestation;
use crate::id::{DatasetId, Hostname};
use crate::known::Known;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A desired node: part of a `Deployment`, the cluster's desired configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub hostname: Hostname,
    #[serde(default)]
    pub manifestations: BTreeMap<DatasetId, Manifestation>,
    #[serde(default)]
    pub applications: Vec<Application>,
    #[serde(default)]
    pub used_ports: Vec<OpenPort>,
}

impl Node {
    pub fn new(hostname: impl Into<Hostname>) -> Self {
        Self {
            hostname: hostname.into(),
            manifestations: BTreeMap::new(),
            applications: Vec::new(),
            used_ports: Vec::new(),
        }
    }

    pub fn with_manifestation(mut self, manifestation: Manifestation) -> Self {
        self.manifestations.insert(manifestation.dataset_id().clone(), manifestation);
        self
    }

    pub fn with_application(mut self, application: Application) -> Self {
        self.applications.push(application);
        self
    }
}

/// The partial observed state produced by one discoverer. Any attribute may
/// be `Known::Unknown` — distinct from a known-empty collection. The merge
/// step (`NodeState::merge`) discriminates "I have no applications" from
/// "I don't know my applications", and `Known::merge` makes that distinction
/// contagious: planning that depends on an unknown attribute must degrade
/// to a no-op rather than guess (see `crate::known`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeState {
    pub hostname: Hostname,
    #[serde(default)]
    pub manifestations: Known<BTreeMap<DatasetId, Manifestation>>,
    #[serde(default)]
    pub paths: Known<BTreeMap<DatasetId, String>>,
    #[serde(default)]
    pub applications: Known<Vec<Application>>,
    #[serde(default)]
    pub used_ports: Known<Vec<OpenPort>>,
    /// Outbound proxies this node currently has configured, as last
    /// enumerated from the network driver. Compared against the desired
    /// set in the proxy-reconfiguration phase so `SetProxies` is only
    /// emitted when something actually changed.
    #[serde(default)]
    pub proxies: Known<Vec<Proxy>>,
}

impl NodeState {
    pub fn unknown(hostname: impl Into<Hostname>) -> Self {
        Self {
            hostname: hostname.into(),
            manifestations: Known::Unknown,
            paths: Known::Unknown,
            applications: Known::Unknown,
            used_ports: Known::Unknown,
            proxies: Known::Unknown,
        }
    }

    /// Merge a fresh partial reading (typically from one discoverer) into
    /// this snapshot. Each attribute is merged independently: a
    /// `Known::Unknown` in `newer` never erases a previously discovered
    /// value.
    pub fn merge(mut self, newer: NodeState) -> NodeState {
        debug_assert_eq!(self.hostname, newer.hostname, "merging NodeStates for different nodes");
        self.manifestations = self.manifestations.merge(newer.manifestations);
        self.paths = self.paths.merge(newer.paths);
        self.applications = self.applications.merge(newer.applications);
        self.used_ports = self.used_ports.merge(newer.used_ports);
        self.proxies = self.proxies.merge(newer.proxies);
        self
    }

    /// Project this observed state down to a desired-config-shaped `Node`,
    /// treating any unknown attribute as empty. Used only for the
    /// dataset-change analyzer, which only ever reads manifestations.
    pub fn manifestations_or_empty(&self) -> BTreeMap<DatasetId, Manifestation> {
        self.manifestations.as_ref().known().cloned().unwrap_or_default()
    }
}

/// The cluster's desired configuration: the set of nodes and what each
/// should be running.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    pub nodes: Vec<Node>,
}

impl Deployment {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn get_node(&self, hostname: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.hostname.as_str() == hostname)
    }
}

/// The observed cluster snapshot: one `NodeState` per node, merged from
/// each node's own discovery plus whatever was last reported by peers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentState {
    pub nodes: Vec<NodeState>,
}

impl DeploymentState {
    pub fn new(nodes: Vec<NodeState>) -> Self {
        Self { nodes }
    }

    pub fn get_node(&self, hostname: &str) -> Option<&NodeState> {
        self.nodes.iter().find(|n| n.hostname.as_str() == hostname)
    }

    /// Replace (or insert) the entry for `state.hostname`.
    pub fn with_node_state(mut self, state: NodeState) -> Self {
        if let Some(existing) = self.nodes.iter_mut().find(|n| n.hostname == state.hostname) {
            *existing = state;
        } else {
            self.nodes.push(state);
        }
        self
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
