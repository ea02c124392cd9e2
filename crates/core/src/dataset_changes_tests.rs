// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::dataset::Manifestation;
use crate::node::{Node, NodeState};
use yare::parameterized;

fn node_state_with_manifestation(hostname: &str, dataset: Dataset) -> NodeState {
    let mut state = NodeState::unknown(hostname);
    state.manifestations = crate::known::Known::Known(BTreeMap::from([(
        dataset.dataset_id.clone(),
        Manifestation::primary(dataset),
    )]));
    state
}

#[test]
fn new_dataset_not_present_anywhere_is_creating() {
    let hostname = Hostname::new("a");
    let desired = Deployment::new(vec![Node::new("a").with_manifestation(Manifestation::primary(
        Dataset::new("d1"),
    ))]);
    let current = DeploymentState::new(vec![NodeState::unknown("a")]);

    let changes = find_dataset_changes(&hostname, &current, &desired).unwrap();
    assert_eq!(changes.creating, HashSet::from([Dataset::new("d1")]));
    assert!(changes.coming.is_empty());
    assert!(changes.going.is_empty());
}

#[test]
fn dataset_owned_by_peer_and_desired_locally_is_coming() {
    let hostname = Hostname::new("a");
    let desired = Deployment::new(vec![Node::new("a").with_manifestation(Manifestation::primary(
        Dataset::new("d1"),
    ))]);
    let current =
        DeploymentState::new(vec![node_state_with_manifestation("b", Dataset::new("d1"))]);

    let changes = find_dataset_changes(&hostname, &current, &desired).unwrap();
    assert_eq!(changes.coming, HashSet::from([Dataset::new("d1")]));
    assert!(changes.creating.is_empty());
}

#[test]
fn dataset_owned_locally_and_desired_on_peer_is_going() {
    let hostname = Hostname::new("a");
    let desired = Deployment::new(vec![Node::new("b").with_manifestation(Manifestation::primary(
        Dataset::new("d1"),
    ))]);
    let current =
        DeploymentState::new(vec![node_state_with_manifestation("a", Dataset::new("d1"))]);

    let changes = find_dataset_changes(&hostname, &current, &desired).unwrap();
    assert_eq!(
        changes.going,
        HashSet::from([DatasetHandoff { dataset: Dataset::new("d1"), hostname: Hostname::new("b") }])
    );
}

#[test]
fn resize_is_emitted_for_locally_present_dataset_regardless_of_future_owner() {
    let hostname = Hostname::new("a");
    let desired = Deployment::new(vec![Node::new("a").with_manifestation(Manifestation::primary(
        Dataset::new("d1").with_maximum_size(20),
    ))]);
    let current = DeploymentState::new(vec![node_state_with_manifestation(
        "a",
        Dataset::new("d1").with_maximum_size(10),
    )]);

    let changes = find_dataset_changes(&hostname, &current, &desired).unwrap();
    assert_eq!(changes.resizing, HashSet::from([Dataset::new("d1").with_maximum_size(20)]));
}

#[test]
fn resize_and_going_can_both_fire_for_the_same_dataset() {
    let hostname = Hostname::new("a");
    let desired = Deployment::new(vec![Node::new("b").with_manifestation(Manifestation::primary(
        Dataset::new("d1").with_maximum_size(20),
    ))]);
    let current = DeploymentState::new(vec![node_state_with_manifestation(
        "a",
        Dataset::new("d1").with_maximum_size(10),
    )]);

    let changes = find_dataset_changes(&hostname, &current, &desired).unwrap();
    assert_eq!(changes.resizing.len(), 1);
    assert_eq!(changes.going.len(), 1);
}

#[test]
fn deleted_dataset_anywhere_is_in_deleting() {
    let hostname = Hostname::new("a");
    let desired = Deployment::new(vec![Node::new("a")
        .with_manifestation(Manifestation::primary(Dataset::new("d1").deleted()))]);
    let current = DeploymentState::new(vec![node_state_with_manifestation("a", Dataset::new("d1"))]);

    let changes = find_dataset_changes(&hostname, &current, &desired).unwrap();
    assert_eq!(changes.deleting, HashSet::from([Dataset::new("d1").deleted()]));
}

#[test]
fn contradictory_coming_and_going_for_same_dataset_is_rejected() {
    // A corrupted/stale current_state claims d1 is primary on both A and B
    // simultaneously (violating ownership uniqueness), while desired_state
    // wants it on A locally and also lists it under B. That makes the
    // dataset land in both `going` (local current has it, B desires it)
    // and `coming` (A desires it, B's current has it) — a contradiction
    // the analyzer must refuse to silently resolve.
    let hostname = Hostname::new("a");
    let desired = Deployment::new(vec![
        Node::new("a").with_manifestation(Manifestation::primary(Dataset::new("d1"))),
        Node::new("b").with_manifestation(Manifestation::primary(Dataset::new("d1"))),
    ]);
    let current = DeploymentState::new(vec![
        node_state_with_manifestation("a", Dataset::new("d1")),
        node_state_with_manifestation("b", Dataset::new("d1")),
    ]);

    let result = find_dataset_changes(&hostname, &current, &desired);
    assert!(result.is_err());
}

#[parameterized(
    empty_cluster = {"a", vec![]},
    single_other_node = {"a", vec!["b"]},
)]
fn creating_and_remote_current_stay_disjoint(hostname: &str, peers: Vec<&str>) {
    let hostname = Hostname::new(hostname);
    let mut current_nodes = vec![NodeState::unknown(hostname.as_str())];
    for peer in &peers {
        current_nodes.push(NodeState::unknown(*peer));
    }
    let desired = Deployment::new(vec![Node::new(hostname.as_str())
        .with_manifestation(Manifestation::primary(Dataset::new("d1")))]);
    let current = DeploymentState::new(current_nodes);

    let changes = find_dataset_changes(&hostname, &current, &desired).unwrap();
    // invariant: creating ∩ coming = ∅, coming ∩ going = ∅
    assert!(changes.creating.is_disjoint(&changes.coming));
    assert!(changes.coming.iter().all(|d| !changes.going.iter().any(|g| g.dataset == *d)));
}
