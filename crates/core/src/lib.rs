// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! convergence-core: the data model, action algebra, and dataset-change
//! analyzer shared by every node in the cluster.

pub mod macros;

pub mod action;
pub mod application;
pub mod clock;
pub mod dataset;
pub mod dataset_changes;
pub mod id;
pub mod identity;
pub mod known;
pub mod link_env;
pub mod node;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use action::{Action, Primitive};
pub use application::{
    Application, DockerImage, Link, OpenPort, Port, Proxy, RestartPolicy,
};
pub use clock::{Clock, FakeClock, SystemClock};
pub use dataset::{AttachedVolume, Dataset, Manifestation, DEFAULT_NAMESPACE};
pub use dataset_changes::{find_dataset_changes, AnalyzerError, DatasetChanges, DatasetHandoff};
pub use id::{DatasetId, Hostname};
pub use identity::{state_dir, IdentityError, NodeIdentity};
pub use known::Known;
pub use link_env::{decode_environment, derived_env_keys, encode_link};
pub use node::{Deployment, DeploymentState, Node, NodeState};
