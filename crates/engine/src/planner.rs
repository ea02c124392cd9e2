// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The convergence planner: turns a dataset-change analysis and the
//! observed/desired application state into the fixed eleven-phase action
//! tree described by the phase table (proxies, firewall, pre-push,
//! resize-in-place, stop, handoff, wait, resize-incoming, create, delete,
//! start/restart).
//!
//! This is a pure function: given `(hostname, desired, cluster_state)` it
//! returns an `Action` value and touches no collaborator. Planning and
//! execution are deliberately separate (`crate::executor` runs what this
//! module builds).

use convergence_core::action::{Action, Primitive};
use convergence_core::application::{OpenPort, Proxy};
use convergence_core::dataset_changes::{find_dataset_changes, AnalyzerError, DatasetChanges};
use convergence_core::id::{DatasetId, Hostname};
use convergence_core::link_env::encode_link;
use convergence_core::node::{Deployment, DeploymentState, Node, NodeState};
use convergence_core::Application;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),
}

/// Compare `desired` against `cluster_state` from `hostname`'s perspective
/// and build the phase plan. Returns `Action::Empty` if this node has no
/// entry at all in `cluster_state` yet (nothing has been discovered, so
/// there is nothing to compare against).
pub fn calculate_changes(
    hostname: &Hostname,
    desired: &Deployment,
    cluster_state: &DeploymentState,
) -> Result<Action, PlanError> {
    let Some(local_state) = cluster_state.get_node(hostname.as_str()) else {
        return Ok(Action::Empty);
    };

    let dataset_changes = find_dataset_changes(hostname, cluster_state, desired)?;
    let desired_node = desired.get_node(hostname.as_str());

    // Without both manifestation and application knowledge, the deployer
    // cannot tell whether an observed container's mount is a managed
    // dataset; guessing risks destructive convergence, so container
    // lifecycle phases are skipped entirely this tick (testable property:
    // unknown contagion).
    let containers_known =
        !local_state.manifestations.is_unknown() && !local_state.applications.is_unknown();

    let mut phases = vec![
        proxy_phase(hostname, desired, local_state),
        firewall_phase(desired_node, local_state),
        push_phase(&dataset_changes),
        resize_in_place_phase(&dataset_changes),
    ];

    if containers_known {
        phases.push(stop_phase(desired_node, local_state));
    }

    phases.push(handoff_phase(&dataset_changes));
    phases.push(wait_phase(&dataset_changes));
    phases.push(resize_incoming_phase(&dataset_changes, cluster_state));
    phases.push(create_phase(&dataset_changes));
    phases.push(delete_phase(&dataset_changes));

    if containers_known {
        phases.push(start_restart_phase(desired, desired_node, local_state));
    }

    Ok(Action::sequential(phases))
}

fn desired_proxies(hostname: &Hostname, desired: &Deployment) -> HashSet<Proxy> {
    desired
        .nodes
        .iter()
        .filter(|node| &node.hostname != hostname)
        .flat_map(|node| {
            node.applications.iter().flat_map(move |app| {
                app.ports
                    .iter()
                    .map(move |port| Proxy { remote_ip: node.hostname.to_string(), external_port: port.external_port })
            })
        })
        .collect()
}

fn proxy_phase(hostname: &Hostname, desired: &Deployment, local_state: &NodeState) -> Action {
    let desired_set = desired_proxies(hostname, desired);
    let observed: HashSet<Proxy> =
        local_state.proxies.as_ref().known().cloned().unwrap_or_default().into_iter().collect();
    if desired_set == observed {
        return Action::Empty;
    }
    let mut proxies: Vec<Proxy> = desired_set.into_iter().collect();
    proxies.sort_by(|a, b| (&a.remote_ip, a.external_port).cmp(&(&b.remote_ip, b.external_port)));
    Action::leaf(Primitive::SetProxies { proxies })
}

fn desired_open_ports(desired_node: Option<&Node>) -> HashSet<OpenPort> {
    desired_node
        .into_iter()
        .flat_map(|node| node.applications.iter())
        .flat_map(|app| app.ports.iter().map(|port| OpenPort { external_port: port.external_port }))
        .collect()
}

fn firewall_phase(desired_node: Option<&Node>, local_state: &NodeState) -> Action {
    let desired_set = desired_open_ports(desired_node);
    let observed: HashSet<OpenPort> =
        local_state.used_ports.as_ref().known().cloned().unwrap_or_default().into_iter().collect();
    if desired_set == observed {
        return Action::Empty;
    }
    let mut ports: Vec<OpenPort> = desired_set.into_iter().collect();
    ports.sort_by_key(|p| p.external_port);
    Action::leaf(Primitive::OpenPorts { ports })
}

fn push_phase(changes: &DatasetChanges) -> Action {
    Action::parallel(
        changes
            .going
            .iter()
            .map(|h| Action::leaf(Primitive::PushDataset { dataset: h.dataset.clone(), hostname: h.hostname.clone() }))
            .collect(),
    )
}

fn resize_in_place_phase(changes: &DatasetChanges) -> Action {
    Action::parallel(
        changes.resizing.iter().map(|d| Action::leaf(Primitive::ResizeDataset { dataset: d.clone() })).collect(),
    )
}

fn stop_phase(desired_node: Option<&Node>, local_state: &NodeState) -> Action {
    let desired_names: HashSet<&str> =
        desired_node.into_iter().flat_map(|n| n.applications.iter()).map(|a| a.name.as_str()).collect();
    let observed = local_state.applications.as_ref().known().cloned().unwrap_or_default();
    let children = observed
        .into_iter()
        .filter(|app| app.running && !desired_names.contains(app.name.as_str()))
        .map(|app| Action::leaf(Primitive::StopApplication { app }))
        .collect();
    Action::parallel(children)
}

fn handoff_phase(changes: &DatasetChanges) -> Action {
    Action::parallel(
        changes
            .going
            .iter()
            .map(|h| Action::leaf(Primitive::HandoffDataset { dataset: h.dataset.clone(), hostname: h.hostname.clone() }))
            .collect(),
    )
}

fn wait_phase(changes: &DatasetChanges) -> Action {
    Action::parallel(changes.coming.iter().map(|d| Action::leaf(Primitive::WaitForDataset { dataset: d.clone() })).collect())
}

/// What a dataset's `maximum_size` was wherever it's currently primary,
/// before this tick's migration — the "what it arrived with" baseline the
/// resize-incoming phase diffs the desired size against.
fn current_max_size(cluster_state: &DeploymentState, dataset_id: &DatasetId) -> Option<u64> {
    cluster_state.nodes.iter().find_map(|n| n.manifestations_or_empty().get(dataset_id)?.dataset.maximum_size)
}

fn resize_incoming_phase(changes: &DatasetChanges, cluster_state: &DeploymentState) -> Action {
    let children = changes
        .coming
        .iter()
        .filter(|d| current_max_size(cluster_state, &d.dataset_id) != d.maximum_size)
        .map(|d| Action::leaf(Primitive::ResizeDataset { dataset: d.clone() }))
        .collect();
    Action::parallel(children)
}

fn create_phase(changes: &DatasetChanges) -> Action {
    Action::parallel(changes.creating.iter().map(|d| Action::leaf(Primitive::CreateDataset { dataset: d.clone() })).collect())
}

fn delete_phase(changes: &DatasetChanges) -> Action {
    Action::parallel(changes.deleting.iter().map(|d| Action::leaf(Primitive::DeleteDataset { dataset: d.clone() })).collect())
}

/// Resolve the hostname of whichever node desires the application named
/// `alias`, for encoding an outgoing link's environment variables. `None`
/// if no desired node runs that application (a dangling link; encoding is
/// simply skipped rather than guessed at).
fn resolve_link_hostname<'a>(desired: &'a Deployment, alias: &str) -> Option<&'a Hostname> {
    desired.nodes.iter().find(|n| n.applications.iter().any(|a| a.name == alias)).map(|n| &n.hostname)
}

/// Bake this application's `links` into environment variables (§4.5)
/// before handing it to `StartApplication`. Only the start-time payload is
/// baked — the comparison copies used to decide whether a restart is
/// needed discount those same variables instead
/// (`Application::normalized_for_comparison`), since discovery now surfaces
/// the `_ADDR`/`_PROTO` lines verbatim rather than stripping them.
fn bake_links(app: &Application, desired: &Deployment) -> Application {
    let mut app = app.clone();
    let mut encoded: Vec<(String, String)> = Vec::new();
    for link in &app.links {
        if let Some(hostname) = resolve_link_hostname(desired, &link.alias) {
            encoded.extend(encode_link(link, hostname.as_str()));
        }
    }
    app.environment.extend(encoded);
    app.with_sorted_environment()
}

fn start_application(app: &Application, desired: &Deployment) -> Action {
    Action::leaf(Primitive::StartApplication { app: bake_links(app, desired) })
}

fn start_restart_phase(desired: &Deployment, desired_node: Option<&Node>, local_state: &NodeState) -> Action {
    let observed = local_state.applications.as_ref().known().cloned().unwrap_or_default();
    let observed_by_name: HashMap<&str, &Application> = observed.iter().map(|a| (a.name.as_str(), a)).collect();

    let mut children = Vec::new();
    for app in desired_node.into_iter().flat_map(|n| n.applications.iter()) {
        match observed_by_name.get(app.name.as_str()) {
            None => children.push(start_application(app, desired)),
            Some(current) => {
                let drifted = current.normalized_for_comparison() != app.normalized_for_comparison();
                if !current.running || drifted {
                    children.push(Action::sequential(vec![
                        Action::leaf(Primitive::StopApplication { app: (*current).clone() }),
                        start_application(app, desired),
                    ]));
                }
            }
        }
    }
    Action::parallel(children)
}

#[cfg(test)]
#[path = "planner_tests.rs"]
mod tests;
