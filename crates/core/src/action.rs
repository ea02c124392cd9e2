// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The action algebra: primitive state-change operations plus two tree
//! combinators.
//!
//! An `Action` is a tagged-variant tree handed to an executor, not a
//! callable object with implicit effects — planning builds a value and
//! never runs anything itself, which makes it pure and trivially
//! unit-testable.

use crate::application::{Application, OpenPort, Proxy};
use crate::dataset::Dataset;
use crate::id::Hostname;
use serde::{Deserialize, Serialize};

/// A primitive state-change operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Primitive {
    /// Create and start a unit for `app` on this node.
    StartApplication { app: Application },
    /// Remove the unit named after `app`. Absence is not a failure.
    StopApplication { app: Application },
    /// Create a new primary manifestation of `dataset` locally.
    CreateDataset { dataset: Dataset },
    /// Adjust the `maximum_size` of an existing local manifestation.
    ResizeDataset { dataset: Dataset },
    /// Block until a local manifestation of `dataset_id` is observed.
    WaitForDataset { dataset: Dataset },
    /// Transfer ownership of the local primary manifestation to `hostname`.
    HandoffDataset { dataset: Dataset, hostname: Hostname },
    /// Copy the current snapshot to `hostname` without transferring ownership.
    PushDataset { dataset: Dataset, hostname: Hostname },
    /// Destroy all local manifestations of `dataset`'s id, best-effort.
    DeleteDataset { dataset: Dataset },
    /// Replace the full set of outbound proxies with `proxies`.
    SetProxies { proxies: Vec<Proxy> },
    /// Replace the full set of open firewall ports with `ports`.
    OpenPorts { ports: Vec<OpenPort> },
}

impl Primitive {
    /// Name for log spans (e.g. `"start_application"`).
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::StartApplication { .. } => "start_application",
            Primitive::StopApplication { .. } => "stop_application",
            Primitive::CreateDataset { .. } => "create_dataset",
            Primitive::ResizeDataset { .. } => "resize_dataset",
            Primitive::WaitForDataset { .. } => "wait_for_dataset",
            Primitive::HandoffDataset { .. } => "handoff_dataset",
            Primitive::PushDataset { .. } => "push_dataset",
            Primitive::DeleteDataset { .. } => "delete_dataset",
            Primitive::SetProxies { .. } => "set_proxies",
            Primitive::OpenPorts { .. } => "open_ports",
        }
    }

    /// Key-value pairs for structured logging.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Primitive::StartApplication { app } => {
                vec![("application", app.name.clone()), ("image", app.image.full_name())]
            }
            Primitive::StopApplication { app } => vec![("application", app.name.clone())],
            Primitive::CreateDataset { dataset } => {
                vec![("dataset_id", dataset.dataset_id.to_string())]
            }
            Primitive::ResizeDataset { dataset } => vec![
                ("dataset_id", dataset.dataset_id.to_string()),
                ("maximum_size", dataset.maximum_size.map(|s| s.to_string()).unwrap_or_default()),
            ],
            Primitive::WaitForDataset { dataset } => {
                vec![("dataset_id", dataset.dataset_id.to_string())]
            }
            Primitive::HandoffDataset { dataset, hostname } => vec![
                ("dataset_id", dataset.dataset_id.to_string()),
                ("hostname", hostname.to_string()),
            ],
            Primitive::PushDataset { dataset, hostname } => vec![
                ("dataset_id", dataset.dataset_id.to_string()),
                ("hostname", hostname.to_string()),
            ],
            Primitive::DeleteDataset { dataset } => {
                vec![("dataset_id", dataset.dataset_id.to_string())]
            }
            Primitive::SetProxies { proxies } => vec![("count", proxies.len().to_string())],
            Primitive::OpenPorts { ports } => vec![("count", ports.len().to_string())],
        }
    }
}

/// A node in the action tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Nothing to do. Distinct from an empty `Sequential`/`Parallel` so
    /// phases can be skipped entirely rather than appear as empty nodes.
    Empty,
    /// A single primitive.
    Leaf(Primitive),
    /// Run children in order; stop at the first failure.
    Sequential(Vec<Action>),
    /// Dispatch all children concurrently; every child runs to completion
    /// regardless of siblings' outcomes; fails if any child fails.
    Parallel(Vec<Action>),
}

impl Action {
    pub fn leaf(primitive: Primitive) -> Self {
        Action::Leaf(primitive)
    }

    /// Build a `Parallel` node, collapsing to `Empty` if there are no
    /// children so the tree stays dense (spec phases are skipped when empty).
    pub fn parallel(children: Vec<Action>) -> Self {
        let children: Vec<Action> = children.into_iter().filter(|c| !c.is_empty()).collect();
        if children.is_empty() {
            Action::Empty
        } else {
            Action::Parallel(children)
        }
    }

    /// Build a `Sequential` node, collapsing to `Empty` if there are no
    /// children.
    pub fn sequential(children: Vec<Action>) -> Self {
        let children: Vec<Action> = children.into_iter().filter(|c| !c.is_empty()).collect();
        if children.is_empty() {
            Action::Empty
        } else {
            Action::Sequential(children)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Action::Empty)
    }
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
