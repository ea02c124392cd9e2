// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::dataset::{Dataset, Manifestation};

#[test]
fn merge_keeps_unknown_from_overwriting_known_applications() {
    let mut with_apps = NodeState::unknown("a");
    with_apps.applications = Known::Known(vec![]);

    let manifestations_only = NodeState::unknown("a");
    let merged = with_apps.merge(manifestations_only);

    assert_eq!(merged.applications, Known::Known(vec![]));
}

#[test]
fn merge_combines_independent_attributes_from_two_discoverers() {
    let mut manifestations_reading = NodeState::unknown("a");
    manifestations_reading.manifestations =
        Known::Known(BTreeMap::from([(DatasetId::new("d1"), Manifestation::primary(Dataset::new("d1")))]));

    let mut applications_reading = NodeState::unknown("a");
    applications_reading.applications = Known::Known(vec![]);

    let merged = manifestations_reading.merge(applications_reading);
    assert!(!merged.manifestations.is_unknown());
    assert!(!merged.applications.is_unknown());
    assert!(merged.used_ports.is_unknown());
}

#[test]
fn deployment_state_with_node_state_replaces_existing_entry() {
    let state = DeploymentState::new(vec![NodeState::unknown("a")]);
    let mut updated = NodeState::unknown("a");
    updated.applications = Known::Known(vec![]);
    let state = state.with_node_state(updated);

    assert_eq!(state.nodes.len(), 1);
    assert!(!state.get_node("a").unwrap().applications.is_unknown());
}

#[test]
fn deployment_get_node_finds_by_hostname() {
    let deployment = Deployment::new(vec![Node::new("a"), Node::new("b")]);
    assert!(deployment.get_node("b").is_some());
    assert!(deployment.get_node("c").is_none());
}
