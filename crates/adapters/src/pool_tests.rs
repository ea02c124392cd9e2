// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn create_then_get_round_trips() {
    let pool = InMemoryStoragePool::new();
    let volume = VolumeHandle::new("default.d1");
    pool.create(&volume, "node-a").await.unwrap();

    let fs = pool.get(&volume).await.unwrap();
    assert_eq!(fs.owner, "node-a");
    assert_eq!(fs.size, 0);
}

#[tokio::test]
async fn creating_twice_is_already_exists() {
    let pool = InMemoryStoragePool::new();
    let volume = VolumeHandle::new("default.d1");
    pool.create(&volume, "node-a").await.unwrap();

    let result = pool.create(&volume, "node-a").await;
    assert!(matches!(result, Err(PoolError::AlreadyExists(_))));
}

#[tokio::test]
async fn shrinking_below_used_bytes_is_rejected() {
    let pool = InMemoryStoragePool::new();
    let volume = VolumeHandle::new("default.d1");
    pool.create(&volume, "node-a").await.unwrap();
    pool.writer(&volume, vec![0u8; 100]).await.unwrap();

    let result = pool.set_maximum_size(&volume, Some(10)).await;
    assert!(matches!(result, Err(PoolError::ShrinkBelowUsed { requested: 10, used: 100 })));
}

#[tokio::test]
async fn writer_then_reader_round_trips_contents() {
    let pool = InMemoryStoragePool::new();
    let volume = VolumeHandle::new("default.d1");
    pool.create(&volume, "node-a").await.unwrap();
    pool.writer(&volume, b"payload".to_vec()).await.unwrap();

    assert_eq!(pool.reader(&volume).await.unwrap(), b"payload".to_vec());
}

#[tokio::test]
async fn change_owner_is_visible_on_subsequent_get() {
    let pool = InMemoryStoragePool::new();
    let volume = VolumeHandle::new("default.d1");
    pool.create(&volume, "node-a").await.unwrap();
    pool.change_owner(&volume, "node-b").await.unwrap();

    assert_eq!(pool.get(&volume).await.unwrap().owner, "node-b");
}

#[tokio::test]
async fn destroy_removes_it_from_enumerate() {
    let pool = InMemoryStoragePool::new();
    let volume = VolumeHandle::new("default.d1");
    pool.create(&volume, "node-a").await.unwrap();
    pool.destroy(&volume).await.unwrap();

    assert!(pool.enumerate().await.unwrap().is_empty());
}

#[tokio::test]
async fn operations_on_unknown_volume_fail_with_no_such_volume() {
    let pool = InMemoryStoragePool::new();
    let volume = VolumeHandle::new("ghost");
    assert!(matches!(pool.get(&volume).await, Err(PoolError::NoSuchVolume(_))));
    assert!(matches!(pool.destroy(&volume).await, Err(PoolError::NoSuchVolume(_))));
}
