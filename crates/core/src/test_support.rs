// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test fixtures for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::application::{Application, DockerImage};
use crate::dataset::{Dataset, Manifestation};
use crate::node::{Deployment, DeploymentState, Node, NodeState};

crate::builder! {
    pub struct DatasetFixtureBuilder => Dataset {
        into {
            dataset_id: crate::id::DatasetId = "fixture-dataset",
        }
        option {
            maximum_size: u64 = None,
        }
        computed {
            metadata: std::collections::BTreeMap<String, String> = Default::default(),
            deleted: bool = false,
        }
    }
}

/// A `Deployment` with one empty node per given hostname.
pub fn empty_deployment(hostnames: &[&str]) -> Deployment {
    Deployment::new(hostnames.iter().map(|h| Node::new(*h)).collect())
}

/// A `DeploymentState` with one unknown node per given hostname.
pub fn unknown_deployment_state(hostnames: &[&str]) -> DeploymentState {
    DeploymentState::new(hostnames.iter().map(|h| NodeState::unknown(*h)).collect())
}

/// A `Node` desiring the single given dataset as a primary manifestation.
pub fn node_desiring(hostname: &str, dataset: Dataset) -> Node {
    Node::new(hostname).with_manifestation(Manifestation::primary(dataset))
}

/// A `NodeState` that has discovered exactly one primary manifestation.
pub fn node_state_with(hostname: &str, dataset: Dataset) -> NodeState {
    let mut state = NodeState::unknown(hostname);
    state.manifestations = crate::known::Known::Known(std::collections::BTreeMap::from([(
        dataset.dataset_id.clone(),
        Manifestation::primary(dataset),
    )]));
    state
}

/// A minimal runnable application for fixtures that don't care about ports,
/// volumes, or links.
pub fn app(name: &str, image: &str) -> Application {
    Application::new(name, DockerImage::from_string(image))
}

// ── Proptest strategies ─────────────────────────────────────────────────

pub mod strategies {
    use crate::dataset::Dataset;
    use crate::id::DatasetId;
    use proptest::prelude::*;

    pub fn arb_dataset_id() -> impl Strategy<Value = DatasetId> {
        "[a-z]{1,8}".prop_map(DatasetId::new)
    }

    pub fn arb_dataset() -> impl Strategy<Value = Dataset> {
        (arb_dataset_id(), proptest::option::of(1u64..1_000_000u64)).prop_map(
            |(dataset_id, maximum_size)| {
                let mut dataset = Dataset::new(dataset_id);
                dataset.maximum_size = maximum_size;
                dataset
            },
        )
    }
}
