// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! convergence-adapters: the external-collaborator capability traits
//! (`ContainerRuntime`, `StoragePool`, `NetworkDriver`,
//! `RemoteVolumeManager`) and their in-memory reference implementations.
//! Real Docker/Kubernetes/ZFS/iptables drivers are out of scope for this
//! crate; any implementation behind these trait boundaries plugs in the
//! same way.

pub mod network;
pub mod pool;
pub mod remote;
pub mod runtime;

pub use network::{InMemoryNetworkDriver, NetworkDriver, NetworkError};
pub use pool::{Filesystem, InMemoryStoragePool, PoolError, StoragePool, VolumeHandle};
pub use remote::{InMemoryRemoteVolumeManager, RemoteError, RemoteVolumeManager, SnapshotId};
pub use runtime::{ContainerRuntime, ContainerSpec, InMemoryContainerRuntime, RuntimeError, Unit, VolumeBinding};
