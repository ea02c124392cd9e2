// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `RemoteVolumeManager`: the transport `PushDataset` and `HandoffDataset`
//! use to move dataset bytes and ownership between nodes. Mirrors the
//! locally-owned/remotely-owned split the underlying transport enforces:
//! `push`/`handoff` may only target a volume this node owns; `receive`/
//! `acquire` may only be called on a volume this node does not own.
//! Violating either is a `PolicyViolation`, never retried.
//!
//! `InMemoryRemoteVolumeManager::peer` derives another node's view of the
//! same in-memory wire (shared ownership registry and pushed-bytes store),
//! so two nodes driven in the same process can actually hand a dataset off
//! to one another the way two real nodes would over the wire.

use crate::pool::VolumeHandle;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("policy violation: {0}")]
    PolicyViolation(String),
    #[error("no such volume on peer: {0}")]
    NoSuchVolume(String),
    #[error("transport error: {0}")]
    Transport(String),
}

pub type SnapshotId = u64;

#[async_trait]
pub trait RemoteVolumeManager: Send + Sync + 'static {
    /// Snapshots available on the peer for `volume`. `volume` must be
    /// locally-owned (we're about to push to a peer we know has prior state).
    async fn snapshots(&self, volume: &VolumeHandle) -> Result<Vec<SnapshotId>, RemoteError>;
    /// Push a snapshot of `volume`'s current bytes to the peer without
    /// transferring ownership. `volume` must be locally-owned.
    async fn push(&self, volume: &VolumeHandle, contents: Vec<u8>) -> Result<(), RemoteError>;
    /// Receive the bytes of `volume` from whichever peer is handing it off.
    /// `volume` must *not* be locally-owned.
    async fn receive(&self, volume: &VolumeHandle) -> Result<Vec<u8>, RemoteError>;
    /// Transfer ownership of `volume` away from this node to `new_owner`.
    /// `volume` must be locally-owned.
    async fn handoff(&self, volume: &VolumeHandle, new_owner: &str) -> Result<(), RemoteError>;
    /// Acquire ownership of `volume` on this node, completing a peer's
    /// handoff. `volume` must *not* be locally-owned beforehand.
    async fn acquire(&self, volume: &VolumeHandle, new_owner_id: &str) -> Result<(), RemoteError>;
}

/// The shared wire two or more `InMemoryRemoteVolumeManager` views of the
/// same cluster transport are backed by: who currently owns each volume,
/// and whatever bytes have been pushed for it. A lone node (no `peer`
/// ever derived from it) just gets a private `Wire` of its own.
#[derive(Clone, Default)]
struct Wire {
    owners: Arc<Mutex<HashMap<VolumeHandle, String>>>,
    pushed: Arc<Mutex<HashMap<VolumeHandle, Vec<u8>>>>,
}

/// In-memory reference transport: the only `RemoteVolumeManager` this crate
/// ships. `new` constructs a standalone node's view; `peer` derives another
/// node's view of the same wire so handoffs between the two are visible on
/// both sides, the way a real transport would be.
#[derive(Clone)]
pub struct InMemoryRemoteVolumeManager {
    hostname: String,
    wire: Wire,
}

impl InMemoryRemoteVolumeManager {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self { hostname: hostname.into(), wire: Wire::default() }
    }

    /// Another node's view of this same transport, for simulating a
    /// connected cluster of two or more nodes in one process.
    pub fn peer(&self, hostname: impl Into<String>) -> Self {
        Self { hostname: hostname.into(), wire: self.wire.clone() }
    }

    /// Seed ownership for a fixture: mark `volume` as locally-owned (or not).
    pub fn set_locally_owned(&self, volume: VolumeHandle, owned: bool) {
        let mut owners = self.wire.owners.lock();
        if owned {
            owners.insert(volume, self.hostname.clone());
        } else {
            owners.remove(&volume);
        }
    }

    fn is_locally_owned(&self, volume: &VolumeHandle) -> bool {
        self.wire.owners.lock().get(volume).is_some_and(|owner| owner == &self.hostname)
    }
}

#[async_trait]
impl RemoteVolumeManager for InMemoryRemoteVolumeManager {
    async fn snapshots(&self, volume: &VolumeHandle) -> Result<Vec<SnapshotId>, RemoteError> {
        if !self.is_locally_owned(volume) {
            return Err(RemoteError::PolicyViolation(format!(
                "snapshots requested for non-locally-owned volume {}",
                volume.0
            )));
        }
        Ok(if self.wire.pushed.lock().contains_key(volume) { vec![0] } else { vec![] })
    }

    async fn push(&self, volume: &VolumeHandle, contents: Vec<u8>) -> Result<(), RemoteError> {
        if !self.is_locally_owned(volume) {
            return Err(RemoteError::PolicyViolation(format!(
                "push attempted on non-locally-owned volume {}",
                volume.0
            )));
        }
        self.wire.pushed.lock().insert(volume.clone(), contents);
        Ok(())
    }

    async fn receive(&self, volume: &VolumeHandle) -> Result<Vec<u8>, RemoteError> {
        if self.is_locally_owned(volume) {
            return Err(RemoteError::PolicyViolation(format!(
                "receive attempted on locally-owned volume {}",
                volume.0
            )));
        }
        self.wire
            .pushed
            .lock()
            .get(volume)
            .cloned()
            .ok_or_else(|| RemoteError::NoSuchVolume(volume.0.clone()))
    }

    async fn handoff(&self, volume: &VolumeHandle, _new_owner: &str) -> Result<(), RemoteError> {
        if !self.is_locally_owned(volume) {
            return Err(RemoteError::PolicyViolation(format!(
                "handoff attempted on non-locally-owned volume {}",
                volume.0
            )));
        }
        // Relinquish only; the peer claims ownership itself via `acquire`
        // once it has actually materialized the volume locally, so there is
        // never a moment where a volume is considered locally-owned by a
        // node that doesn't yet have its bytes.
        self.wire.owners.lock().remove(volume);
        Ok(())
    }

    async fn acquire(&self, volume: &VolumeHandle, _new_owner_id: &str) -> Result<(), RemoteError> {
        if self.is_locally_owned(volume) {
            return Err(RemoteError::PolicyViolation(format!(
                "acquire attempted on already locally-owned volume {}",
                volume.0
            )));
        }
        self.wire.owners.lock().insert(volume.clone(), self.hostname.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
