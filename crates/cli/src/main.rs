// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A thin binary that runs the convergence loop against a desired-deployment
//! file, for manual operation and smoke testing. Ships only against the
//! in-memory reference adapters — a real Docker/ZFS/iptables-backed runner
//! is an external collaborator outside this crate (see `convergence-adapters`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use convergence_adapters::{InMemoryContainerRuntime, InMemoryNetworkDriver, InMemoryRemoteVolumeManager, InMemoryStoragePool};
use convergence_core::identity::{state_dir, NodeIdentity};
use convergence_core::node::{Deployment, DeploymentState, NodeState};
use convergence_core::Hostname;
use convergence_engine::{ConvergenceDriver, EngineConfig, NodeDeployer};

#[derive(Debug, Parser)]
#[command(name = "convergenced", about = "Run the node convergence loop against a desired deployment")]
struct Cli {
    /// Path to a JSON-encoded `Deployment` describing the cluster's desired state.
    #[arg(long)]
    deployment: PathBuf,

    /// This node's address in the desired deployment. Defaults to $HOSTNAME.
    #[arg(long)]
    hostname: Option<String>,

    /// Run this many ticks and exit. Omit to converge forever.
    #[arg(long)]
    ticks: Option<u64>,

    /// Override the state directory (defaults to the platform state dir).
    #[arg(long)]
    state_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let state_dir = match cli.state_dir {
        Some(dir) => dir,
        None => state_dir().context("resolving state directory")?,
    };
    std::fs::create_dir_all(&state_dir).context("creating state directory")?;

    let identity = NodeIdentity::load_or_create(&state_dir).context("loading node identity")?;
    let config = EngineConfig::load(&state_dir).context("loading engine config")?;
    tracing::info!(node_uuid = %identity.uuid, poll_interval_secs = config.poll_interval_secs, "starting convergence loop");

    let hostname = cli
        .hostname
        .or_else(|| std::env::var("HOSTNAME").ok())
        .context("--hostname not given and $HOSTNAME is not set")?;
    let hostname = Hostname::new(hostname);

    let deployment_json = std::fs::read_to_string(&cli.deployment)
        .with_context(|| format!("reading deployment file at {}", cli.deployment.display()))?;
    let desired: Deployment =
        serde_json::from_str(&deployment_json).context("parsing deployment file as JSON")?;

    let runtime = InMemoryContainerRuntime::new();
    let pool = InMemoryStoragePool::new();
    let network = InMemoryNetworkDriver::new();

    let deployer = NodeDeployer::new(hostname.clone(), runtime.clone(), pool.clone(), network.clone());
    let executor = convergence_engine::Executor::new(
        hostname.clone(),
        runtime,
        pool,
        network,
        InMemoryRemoteVolumeManager::new(hostname.as_str()),
    );
    let driver = ConvergenceDriver::new(deployer, executor);

    let mut local_state = NodeState::unknown(hostname);
    let mut cluster_state = DeploymentState::default();
    let mut tick_count: u64 = 0;

    loop {
        if let Some(limit) = cli.ticks {
            if tick_count >= limit {
                break;
            }
        }

        let (next_local, next_cluster) = driver.tick(&local_state, &desired, &cluster_state).await?;
        local_state = next_local;
        cluster_state = next_cluster;
        tick_count += 1;

        if cli.ticks.is_none() {
            tokio::time::sleep(config.poll_interval()).await;
        }
    }

    Ok(())
}
