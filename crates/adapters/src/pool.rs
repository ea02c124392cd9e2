// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `StoragePool`: the capability interface the manifestation deployer and
//! the dataset primitives use to create, resize, clone, and destroy local
//! volumes. Ships only the in-memory reference pool; a real ZFS/Cinder
//! driver is an external collaborator outside this crate.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("no such volume: {0}")]
    NoSuchVolume(String),
    #[error("volume already exists: {0}")]
    AlreadyExists(String),
    #[error("cannot shrink below used bytes: requested {requested}, used {used}")]
    ShrinkBelowUsed { requested: u64, used: u64 },
}

/// Identifies a volume the pool manages; corresponds to `Dataset::volume_name()`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VolumeHandle(pub String);

impl VolumeHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// A concrete filesystem instance: the pool's view of one volume's state.
#[derive(Debug, Clone, PartialEq)]
pub struct Filesystem {
    pub volume: VolumeHandle,
    pub path: String,
    pub size: u64,
    pub maximum_size: Option<u64>,
    pub owner: String,
    contents: Vec<u8>,
}

impl Filesystem {
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait]
pub trait StoragePool: Send + Sync + 'static {
    async fn create(&self, volume: &VolumeHandle, owner: &str) -> Result<Filesystem, PoolError>;
    async fn set_maximum_size(&self, volume: &VolumeHandle, size: Option<u64>) -> Result<(), PoolError>;
    async fn clone_to(&self, parent: &VolumeHandle, new: &VolumeHandle) -> Result<Filesystem, PoolError>;
    async fn change_owner(&self, volume: &VolumeHandle, new_owner: &str) -> Result<(), PoolError>;
    async fn destroy(&self, volume: &VolumeHandle) -> Result<(), PoolError>;
    async fn enumerate(&self) -> Result<Vec<Filesystem>, PoolError>;
    async fn get(&self, volume: &VolumeHandle) -> Result<Filesystem, PoolError>;
    /// A byte snapshot of the volume's current contents, for push/handoff.
    async fn reader(&self, volume: &VolumeHandle) -> Result<Vec<u8>, PoolError>;
    /// Overwrite the volume's contents, as the receiving side of a handoff.
    async fn writer(&self, volume: &VolumeHandle, contents: Vec<u8>) -> Result<(), PoolError>;
}

/// In-memory reference pool: the only `StoragePool` this crate ships.
#[derive(Clone, Default)]
pub struct InMemoryStoragePool {
    volumes: Arc<Mutex<HashMap<VolumeHandle, Filesystem>>>,
}

impl InMemoryStoragePool {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoragePool for InMemoryStoragePool {
    async fn create(&self, volume: &VolumeHandle, owner: &str) -> Result<Filesystem, PoolError> {
        let mut volumes = self.volumes.lock();
        if volumes.contains_key(volume) {
            return Err(PoolError::AlreadyExists(volume.0.clone()));
        }
        let fs = Filesystem {
            volume: volume.clone(),
            path: format!("/volumes/{}", volume.0),
            size: 0,
            maximum_size: None,
            owner: owner.to_string(),
            contents: Vec::new(),
        };
        volumes.insert(volume.clone(), fs.clone());
        Ok(fs)
    }

    async fn set_maximum_size(&self, volume: &VolumeHandle, size: Option<u64>) -> Result<(), PoolError> {
        let mut volumes = self.volumes.lock();
        let fs = volumes.get_mut(volume).ok_or_else(|| PoolError::NoSuchVolume(volume.0.clone()))?;
        if let Some(requested) = size {
            if requested < fs.size {
                return Err(PoolError::ShrinkBelowUsed { requested, used: fs.size });
            }
        }
        fs.maximum_size = size;
        Ok(())
    }

    async fn clone_to(&self, parent: &VolumeHandle, new: &VolumeHandle) -> Result<Filesystem, PoolError> {
        let mut volumes = self.volumes.lock();
        let parent_fs = volumes.get(parent).ok_or_else(|| PoolError::NoSuchVolume(parent.0.clone()))?.clone();
        if volumes.contains_key(new) {
            return Err(PoolError::AlreadyExists(new.0.clone()));
        }
        let fs = Filesystem {
            volume: new.clone(),
            path: format!("/volumes/{}", new.0),
            ..parent_fs
        };
        volumes.insert(new.clone(), fs.clone());
        Ok(fs)
    }

    async fn change_owner(&self, volume: &VolumeHandle, new_owner: &str) -> Result<(), PoolError> {
        let mut volumes = self.volumes.lock();
        let fs = volumes.get_mut(volume).ok_or_else(|| PoolError::NoSuchVolume(volume.0.clone()))?;
        fs.owner = new_owner.to_string();
        Ok(())
    }

    async fn destroy(&self, volume: &VolumeHandle) -> Result<(), PoolError> {
        self.volumes
            .lock()
            .remove(volume)
            .map(|_| ())
            .ok_or_else(|| PoolError::NoSuchVolume(volume.0.clone()))
    }

    async fn enumerate(&self) -> Result<Vec<Filesystem>, PoolError> {
        Ok(self.volumes.lock().values().cloned().collect())
    }

    async fn get(&self, volume: &VolumeHandle) -> Result<Filesystem, PoolError> {
        self.volumes.lock().get(volume).cloned().ok_or_else(|| PoolError::NoSuchVolume(volume.0.clone()))
    }

    async fn reader(&self, volume: &VolumeHandle) -> Result<Vec<u8>, PoolError> {
        Ok(self
            .volumes
            .lock()
            .get(volume)
            .ok_or_else(|| PoolError::NoSuchVolume(volume.0.clone()))?
            .contents
            .clone())
    }

    async fn writer(&self, volume: &VolumeHandle, contents: Vec<u8>) -> Result<(), PoolError> {
        let mut volumes = self.volumes.lock();
        let fs = volumes.get_mut(volume).ok_or_else(|| PoolError::NoSuchVolume(volume.0.clone()))?;
        fs.size = contents.len() as u64;
        fs.contents = contents;
        Ok(())
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
