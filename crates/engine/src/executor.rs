// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Executes an `Action` tree against the four external collaborator traits.

use convergence_adapters::{
    ContainerRuntime, ContainerSpec, NetworkDriver, PoolError, RemoteVolumeManager, RuntimeError,
    StoragePool, VolumeBinding, VolumeHandle,
};
use convergence_adapters::{NetworkError, RemoteError};
use convergence_core::action::{Action, Primitive};
use convergence_core::application::Application;
use convergence_core::dataset::Dataset;
use convergence_core::id::Hostname;
use std::time::{Duration, Instant};
use thiserror::Error;

/// How long `WaitForDataset` polls before giving up. Bounded external
/// deadline, per the primitive's documented contract.
const WAIT_FOR_DATASET_TIMEOUT: Duration = Duration::from_secs(30);
const WAIT_FOR_DATASET_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("container runtime error: {0}")]
    Runtime(#[from] RuntimeError),
    #[error("storage pool error: {0}")]
    Pool(#[from] PoolError),
    #[error("network driver error: {0}")]
    Network(#[from] NetworkError),
    #[error("remote volume manager error: {0}")]
    Remote(#[from] RemoteError),
    #[error("timed out waiting for dataset {0}")]
    WaitTimeout(String),
    #[error("{0} of {1} actions in a parallel batch failed: {2:?}")]
    Aggregate(usize, usize, Vec<ActionError>),
}

/// The collaborators one node's executor drives. Generic over each trait so
/// tests can swap in fakes without dynamic dispatch.
pub struct Executor<R, P, N, M> {
    runtime: R,
    pool: P,
    network: N,
    remote: M,
    hostname: Hostname,
}

impl<R, P, N, M> Executor<R, P, N, M>
where
    R: ContainerRuntime,
    P: StoragePool,
    N: NetworkDriver,
    M: RemoteVolumeManager,
{
    pub fn new(hostname: Hostname, runtime: R, pool: P, network: N, remote: M) -> Self {
        Self { runtime, pool, network, remote, hostname }
    }

    /// Run the full action tree to completion (or first sequential failure).
    pub async fn execute(&self, action: &Action) -> Result<(), ActionError> {
        match action {
            Action::Empty => Ok(()),
            Action::Leaf(primitive) => self.execute_primitive(primitive).await,
            Action::Sequential(children) => {
                for child in children {
                    Box::pin(self.execute(child)).await?;
                }
                Ok(())
            }
            Action::Parallel(children) => {
                let results = futures::future::join_all(
                    children.iter().map(|child| Box::pin(self.execute(child))),
                )
                .await;
                let failures: Vec<ActionError> = results.into_iter().filter_map(Result::err).collect();
                if failures.is_empty() {
                    Ok(())
                } else {
                    let failed = failures.len();
                    Err(ActionError::Aggregate(failed, children.len(), failures))
                }
            }
        }
    }

    async fn execute_primitive(&self, primitive: &Primitive) -> Result<(), ActionError> {
        let name = primitive.name();
        let fields = primitive.fields();
        let verbose = is_verbose(primitive);

        if verbose {
            tracing::info!(primitive = name, ?fields, "starting");
        }

        let start = Instant::now();
        let result = self.run_primitive(primitive).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(()) if verbose => tracing::info!(primitive = name, elapsed_ms, "completed"),
            Ok(()) => tracing::info!(primitive = name, ?fields, elapsed_ms, "executed"),
            Err(err) if verbose => tracing::error!(primitive = name, elapsed_ms, error = %err, "failed"),
            Err(err) => tracing::error!(primitive = name, ?fields, elapsed_ms, error = %err, "failed"),
        }

        result
    }

    async fn run_primitive(&self, primitive: &Primitive) -> Result<(), ActionError> {
        match primitive {
            Primitive::StartApplication { app } => self.start_application(app).await,
            Primitive::StopApplication { app } => {
                self.runtime.remove(&app.name).await?;
                Ok(())
            }
            Primitive::CreateDataset { dataset } => {
                let handle = volume(dataset);
                self.pool.create(&handle, self.hostname.as_str()).await?;
                match self.remote.acquire(&handle, self.hostname.as_str()).await {
                    Ok(()) | Err(RemoteError::PolicyViolation(_)) => Ok(()),
                    Err(err) => Err(err.into()),
                }
            }
            Primitive::ResizeDataset { dataset } => {
                self.pool.set_maximum_size(&volume(dataset), dataset.maximum_size).await?;
                Ok(())
            }
            Primitive::WaitForDataset { dataset } => self.wait_for_dataset(dataset).await,
            Primitive::HandoffDataset { dataset, hostname } => {
                let handle = volume(dataset);
                let contents = self.pool.reader(&handle).await?;
                self.remote.push(&handle, contents).await?;
                self.remote.handoff(&handle, hostname.as_str()).await?;
                self.pool.destroy(&handle).await?;
                Ok(())
            }
            Primitive::PushDataset { dataset, .. } => {
                let handle = volume(dataset);
                let contents = self.pool.reader(&handle).await?;
                self.remote.push(&handle, contents).await?;
                Ok(())
            }
            Primitive::DeleteDataset { dataset } => {
                // Best-effort: absence is not treated as failure for a primitive
                // whose whole point is "make sure this is gone".
                match self.pool.destroy(&volume(dataset)).await {
                    Ok(()) | Err(PoolError::NoSuchVolume(_)) => Ok(()),
                    Err(err) => Err(err.into()),
                }
            }
            Primitive::SetProxies { proxies } => {
                let network = self.network_handle();
                let proxies = proxies.clone();
                tokio::task::spawn_blocking(move || replace_proxies(&network, &proxies))
                    .await
                    .expect("spawn_blocking panicked")?;
                Ok(())
            }
            Primitive::OpenPorts { ports } => {
                let network = self.network_handle();
                let ports = ports.clone();
                tokio::task::spawn_blocking(move || replace_open_ports(&network, &ports))
                    .await
                    .expect("spawn_blocking panicked")?;
                Ok(())
            }
        }
    }

    async fn start_application(&self, app: &Application) -> Result<(), ActionError> {
        let volume = match &app.volume {
            Some(attached) => {
                let handle = VolumeHandle::new(attached.manifestation.dataset.volume_name());
                let fs = self.pool.get(&handle).await?;
                Some(VolumeBinding {
                    container_path: attached.mountpoint.clone(),
                    node_path: fs.path().to_string(),
                })
            }
            None => None,
        };

        let spec = ContainerSpec {
            name: app.name.clone(),
            image: app.image.full_name(),
            ports: app.ports.iter().map(|p| (p.internal_port, p.external_port)).collect(),
            volume,
            environment: app.environment.clone(),
            memory_limit: app.memory_limit,
            cpu_shares: app.cpu_shares,
            restart_policy: app.restart_policy.clone(),
        };
        self.runtime.add(spec).await?;
        Ok(())
    }

    async fn wait_for_dataset(&self, dataset: &Dataset) -> Result<(), ActionError> {
        let handle = volume(dataset);
        let deadline = Instant::now() + WAIT_FOR_DATASET_TIMEOUT;
        loop {
            if self.pool.get(&handle).await.is_ok() {
                return Ok(());
            }
            match self.remote.receive(&handle).await {
                Ok(contents) => return self.materialize(&handle, contents).await,
                Err(RemoteError::NoSuchVolume(_)) | Err(RemoteError::PolicyViolation(_)) => {}
                Err(err) => return Err(err.into()),
            }
            if Instant::now() >= deadline {
                return Err(ActionError::WaitTimeout(dataset.dataset_id.to_string()));
            }
            tokio::time::sleep(WAIT_FOR_DATASET_POLL_INTERVAL).await;
        }
    }

    /// Write bytes received from a peer into the local pool and claim
    /// ownership, completing the receiving half of a handoff. Tolerates
    /// losing a race against an identical concurrent materialize attempt.
    async fn materialize(&self, handle: &VolumeHandle, contents: Vec<u8>) -> Result<(), ActionError> {
        match self.pool.create(handle, self.hostname.as_str()).await {
            Ok(_) | Err(PoolError::AlreadyExists(_)) => {}
            Err(err) => return Err(err.into()),
        }
        self.pool.writer(handle, contents).await?;
        match self.remote.acquire(handle, self.hostname.as_str()).await {
            Ok(()) | Err(RemoteError::PolicyViolation(_)) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// `NetworkDriver` is synchronous (see its trait docs); this hands a
    /// clone to a blocking task rather than holding `&self` across it.
    fn network_handle(&self) -> N
    where
        N: Clone,
    {
        self.network.clone()
    }
}

fn volume(dataset: &Dataset) -> VolumeHandle {
    VolumeHandle::new(dataset.volume_name())
}

fn is_verbose(primitive: &Primitive) -> bool {
    !matches!(
        primitive,
        Primitive::WaitForDataset { .. } | Primitive::SetProxies { .. } | Primitive::OpenPorts { .. }
    )
}

fn replace_proxies<N: NetworkDriver>(
    network: &N,
    desired: &[convergence_core::application::Proxy],
) -> Result<(), ActionError> {
    let existing = network.enumerate_proxies()?;
    let mut failures = Vec::new();
    for proxy in &existing {
        if let Err(err) = network.delete_proxy(proxy) {
            failures.push(ActionError::Network(err));
        }
    }
    for proxy in desired {
        if let Err(err) = network.create_proxy_to(&proxy.remote_ip, proxy.external_port) {
            failures.push(ActionError::Network(err));
        }
    }
    aggregate(failures, existing.len() + desired.len())
}

fn replace_open_ports<N: NetworkDriver>(
    network: &N,
    desired: &[convergence_core::application::OpenPort],
) -> Result<(), ActionError> {
    let existing = network.enumerate_open_ports()?;
    let mut failures = Vec::new();
    for port in &existing {
        if let Err(err) = network.delete_open_port(port) {
            failures.push(ActionError::Network(err));
        }
    }
    for port in desired {
        if let Err(err) = network.open_port(*port) {
            failures.push(ActionError::Network(err));
        }
    }
    aggregate(failures, existing.len() + desired.len())
}

fn aggregate(failures: Vec<ActionError>, total: usize) -> Result<(), ActionError> {
    if failures.is_empty() {
        Ok(())
    } else {
        let failed = failures.len();
        Err(ActionError::Aggregate(failed, total, failures))
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
