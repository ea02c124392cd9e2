// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The produced `Deployer` capability and the convergence driver: the glue
//! that runs discover → calculate → execute once per tick.

use crate::application_deployer::ApplicationDeployer;
use crate::executor::{ActionError, Executor};
use crate::manifestation_deployer::ManifestationDeployer;
use crate::planner::{calculate_changes, PlanError};
use async_trait::async_trait;
use convergence_adapters::{
    ContainerRuntime, NetworkDriver, NetworkError, PoolError, RemoteVolumeManager, RuntimeError, StoragePool,
};
use convergence_core::{Action, Deployment, DeploymentState, Hostname, NodeState};
use thiserror::Error;
use tracing::Instrument;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("container runtime error: {0}")]
    Runtime(#[from] RuntimeError),
    #[error("storage pool error: {0}")]
    Pool(#[from] PoolError),
    #[error("network driver error: {0}")]
    Network(#[from] NetworkError),
}

#[derive(Debug, Error)]
pub enum TickError {
    #[error("discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),
    #[error("planning failed: {0}")]
    Plan(#[from] PlanError),
    #[error("execution failed: {0}")]
    Execute(#[from] ActionError),
}

/// The per-node capability the driver consumes: discover this node's local
/// reality and, given that reality merged into a cluster snapshot, compute
/// the action tree that converges it toward `desired`.
#[async_trait]
pub trait Deployer: Send + Sync {
    fn hostname(&self) -> &Hostname;
    async fn discover_state(&self, prior: &NodeState) -> Result<NodeState, DiscoveryError>;
    fn calculate_changes(&self, desired: &Deployment, cluster_state: &DeploymentState) -> Result<Action, PlanError>;
}

/// Composes the manifestation and application deployers into one
/// `Deployer`: manifestation discovery runs first so its `paths` reading
/// is available for the application deployer to resolve volume mounts
/// against, exactly as §4.4 describes.
pub struct NodeDeployer<R, P, N> {
    hostname: Hostname,
    manifestations: ManifestationDeployer<P>,
    applications: ApplicationDeployer<R, N>,
}

impl<R, P, N> NodeDeployer<R, P, N>
where
    R: ContainerRuntime,
    P: StoragePool,
    N: NetworkDriver + Clone,
{
    pub fn new(hostname: Hostname, runtime: R, pool: P, network: N) -> Self {
        let manifestations = ManifestationDeployer::new(hostname.clone(), pool);
        let applications = ApplicationDeployer::new(hostname.clone(), runtime, network);
        Self { hostname, manifestations, applications }
    }
}

#[async_trait]
impl<R, P, N> Deployer for NodeDeployer<R, P, N>
where
    R: ContainerRuntime,
    P: StoragePool,
    N: NetworkDriver + Clone,
{
    fn hostname(&self) -> &Hostname {
        &self.hostname
    }

    async fn discover_state(&self, prior: &NodeState) -> Result<NodeState, DiscoveryError> {
        let manifestation_reading = self.manifestations.discover_state(prior).await?;
        let merged = prior.clone().merge(manifestation_reading);
        let application_reading = self.applications.discover_state(&merged).await?;
        Ok(merged.merge(application_reading))
    }

    fn calculate_changes(&self, desired: &Deployment, cluster_state: &DeploymentState) -> Result<Action, PlanError> {
        calculate_changes(&self.hostname, desired, cluster_state)
    }
}

/// Runs one discover → calculate → execute cycle per `tick`. Holds no
/// state of its own between ticks; the caller threads `prior`/`cluster_state`
/// through to the next call, so a crashed and restarted driver just
/// resumes from whatever it last persisted (or from scratch).
pub struct ConvergenceDriver<D, R, P, N, M> {
    deployer: D,
    executor: Executor<R, P, N, M>,
}

impl<D, R, P, N, M> ConvergenceDriver<D, R, P, N, M>
where
    D: Deployer,
    R: ContainerRuntime,
    P: StoragePool,
    N: NetworkDriver,
    M: RemoteVolumeManager,
{
    pub fn new(deployer: D, executor: Executor<R, P, N, M>) -> Self {
        Self { deployer, executor }
    }

    /// Discover this node's state, merge it into `cluster_state`, plan,
    /// and execute. Returns the updated local and cluster state for the
    /// next call.
    pub async fn tick(
        &self,
        prior: &NodeState,
        desired: &Deployment,
        cluster_state: &DeploymentState,
    ) -> Result<(NodeState, DeploymentState), TickError> {
        let hostname = self.deployer.hostname().clone();
        let span = tracing::info_span!("convergence_tick", hostname = %hostname);
        async {
            let local_state = self.deployer.discover_state(prior).await?;
            let cluster_state = cluster_state.clone().with_node_state(local_state.clone());
            let action = self.deployer.calculate_changes(desired, &cluster_state)?;
            self.executor.execute(&action).await?;
            Ok((local_state, cluster_state))
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
