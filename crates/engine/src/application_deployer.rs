// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The application deployer: discovers local containers from the runtime,
//! decoding link-encoded environment variables and mapping volume mounts
//! back to managed datasets via the manifestation deployer's prior reading.

use crate::driver::DiscoveryError;
use convergence_adapters::{ContainerRuntime, NetworkDriver, Unit};
use convergence_core::application::{OpenPort, Port, Proxy};
use convergence_core::dataset::AttachedVolume;
use convergence_core::id::{DatasetId, Hostname};
use convergence_core::known::Known;
use convergence_core::link_env::decode_environment;
use convergence_core::node::NodeState;
use convergence_core::Application;
use std::collections::HashMap;

pub struct ApplicationDeployer<R, N> {
    hostname: Hostname,
    runtime: R,
    network: N,
}

impl<R, N> ApplicationDeployer<R, N>
where
    R: ContainerRuntime,
    N: NetworkDriver + Clone,
{
    pub fn new(hostname: Hostname, runtime: R, network: N) -> Self {
        Self { hostname, runtime, network }
    }

    /// List container-runtime units and translate each into an
    /// `Application`, plus the observed firewall/proxy state the planner
    /// diffs against in phases 1-2. `prior` must already carry the
    /// manifestation deployer's reading (paths + manifestations) so volume
    /// mounts can be traced back to managed datasets; a path the
    /// manifestation deployer doesn't recognize just means `volume: None`,
    /// not a failure.
    pub async fn discover_state(&self, prior: &NodeState) -> Result<NodeState, DiscoveryError> {
        let units = self.runtime.list().await?;

        let path_index: HashMap<&str, &DatasetId> = prior
            .paths
            .as_ref()
            .known()
            .map(|paths| paths.iter().map(|(id, path)| (path.as_str(), id)).collect())
            .unwrap_or_default();
        let manifestations = prior.manifestations.as_ref().known();

        let applications: Vec<Application> = units
            .into_iter()
            .map(|unit| application_from_unit(unit, &path_index, manifestations))
            .collect();

        let network = self.network.clone();
        let (used_ports, proxies) =
            tokio::task::spawn_blocking(move || read_network_state(&network))
                .await
                .expect("spawn_blocking panicked")?;

        let mut state = NodeState::unknown(self.hostname.clone());
        state.applications = Known::Known(applications);
        state.used_ports = Known::Known(used_ports);
        state.proxies = Known::Known(proxies);
        Ok(state)
    }
}

fn application_from_unit(
    unit: Unit,
    path_index: &HashMap<&str, &DatasetId>,
    manifestations: Option<&std::collections::BTreeMap<DatasetId, convergence_core::Manifestation>>,
) -> Application {
    let image = convergence_core::DockerImage::from_string(&unit.image);
    let ports: Vec<Port> = unit
        .ports
        .iter()
        .map(|&(internal_port, external_port)| Port { internal_port, external_port })
        .collect();

    let volume = unit.volume.as_ref().and_then(|binding| {
        let dataset_id = path_index.get(binding.node_path.as_str())?;
        let manifestation = manifestations?.get(*dataset_id)?;
        Some(AttachedVolume {
            manifestation: manifestation.clone(),
            mountpoint: binding.container_path.clone(),
        })
    });

    let (links, user_environment) = decode_environment(&unit.environment);

    Application {
        name: unit.name,
        image,
        ports,
        volume,
        links,
        environment: user_environment,
        memory_limit: unit.memory_limit,
        cpu_shares: unit.cpu_shares,
        restart_policy: unit.restart_policy,
        running: unit.active,
    }
    .with_sorted_environment()
}

fn read_network_state<N: NetworkDriver>(
    network: &N,
) -> Result<(Vec<OpenPort>, Vec<Proxy>), DiscoveryError> {
    let used_ports = network.enumerate_used_ports()?;
    let proxies = network.enumerate_proxies()?;
    Ok((used_ports, proxies))
}

#[cfg(test)]
#[path = "application_deployer_tests.rs"]
mod tests;
