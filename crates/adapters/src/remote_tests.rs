// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn push_on_locally_owned_volume_succeeds() {
    let manager = InMemoryRemoteVolumeManager::new("a");
    let volume = VolumeHandle::new("default.d1");
    manager.set_locally_owned(volume.clone(), true);

    manager.push(&volume, b"data".to_vec()).await.unwrap();
    assert_eq!(manager.snapshots(&volume).await.unwrap(), vec![0]);
}

#[tokio::test]
async fn push_on_non_locally_owned_volume_is_a_policy_violation() {
    let manager = InMemoryRemoteVolumeManager::new("a");
    let volume = VolumeHandle::new("default.d1");

    let result = manager.push(&volume, b"data".to_vec()).await;
    assert!(matches!(result, Err(RemoteError::PolicyViolation(_))));
}

#[tokio::test]
async fn receive_on_locally_owned_volume_is_a_policy_violation() {
    let manager = InMemoryRemoteVolumeManager::new("a");
    let volume = VolumeHandle::new("default.d1");
    manager.set_locally_owned(volume.clone(), true);

    let result = manager.receive(&volume).await;
    assert!(matches!(result, Err(RemoteError::PolicyViolation(_))));
}

#[tokio::test]
async fn receive_fetches_bytes_pushed_before_ownership_moved_away() {
    let manager = InMemoryRemoteVolumeManager::new("a");
    let volume = VolumeHandle::new("default.d1");
    manager.set_locally_owned(volume.clone(), true);
    manager.push(&volume, b"payload".to_vec()).await.unwrap();

    // Ownership has since moved to the peer; this node may now receive.
    manager.set_locally_owned(volume.clone(), false);
    assert_eq!(manager.receive(&volume).await.unwrap(), b"payload".to_vec());
}

#[tokio::test]
async fn handoff_then_acquire_moves_ownership() {
    let manager = InMemoryRemoteVolumeManager::new("a");
    let volume = VolumeHandle::new("default.d1");
    manager.set_locally_owned(volume.clone(), true);

    manager.handoff(&volume, "node-b").await.unwrap();
    assert!(manager.acquire(&volume, "node-b").await.is_ok());
}

#[tokio::test]
async fn acquire_on_already_owned_volume_is_a_policy_violation() {
    let manager = InMemoryRemoteVolumeManager::new("a");
    let volume = VolumeHandle::new("default.d1");
    manager.set_locally_owned(volume.clone(), true);

    let result = manager.acquire(&volume, "node-b").await;
    assert!(matches!(result, Err(RemoteError::PolicyViolation(_))));
}
