// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::dataset::{Dataset, Manifestation};

#[test]
fn docker_image_parses_repo_and_tag() {
    let img = DockerImage::from_string("web:v2");
    assert_eq!(img.repository, "web");
    assert_eq!(img.tag, "v2");
    assert_eq!(img.full_name(), "web:v2");
}

#[test]
fn docker_image_defaults_to_latest_tag() {
    let img = DockerImage::from_string("web");
    assert_eq!(img.tag, "latest");
}

#[test]
fn sorted_environment_is_key_ordered() {
    let mut app = Application::new("web", DockerImage::from_string("web:v1"));
    app.environment = vec![("B".into(), "2".into()), ("A".into(), "1".into())];
    let app = app.with_sorted_environment();
    assert_eq!(app.environment, vec![("A".into(), "1".into()), ("B".into(), "2".into())]);
}

#[test]
fn normalized_comparison_clears_volume_metadata_and_running_flag() {
    let mut manifestation = Manifestation::primary(Dataset::new("d1"));
    manifestation.dataset.metadata.insert("k".into(), "v".into());
    let mut app = Application::new("db", DockerImage::from_string("db:v1"));
    app.volume = Some(AttachedVolume { manifestation, mountpoint: "/data".into() });
    app.running = true;

    let normalized = app.normalized_for_comparison();
    assert!(normalized.volume.unwrap().manifestation.dataset.metadata.is_empty());
    assert!(!normalized.running);
}

#[test]
fn restart_policy_defaults_to_never() {
    assert_eq!(RestartPolicy::default(), RestartPolicy::Never);
}
