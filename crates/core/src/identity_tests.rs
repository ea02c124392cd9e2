// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn first_start_creates_identity_file_with_a_uuid() {
    let dir = tempfile::tempdir().unwrap();
    let identity = NodeIdentity::load_or_create(dir.path()).unwrap();

    assert_eq!(identity.version, IDENTITY_VERSION);
    assert!(Uuid::parse_str(&identity.uuid).is_ok());
    assert!(dir.path().join(IDENTITY_FILE).exists());
}

#[test]
fn second_load_returns_the_same_uuid() {
    let dir = tempfile::tempdir().unwrap();
    let first = NodeIdentity::load_or_create(dir.path()).unwrap();
    let second = NodeIdentity::load_or_create(dir.path()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn unsupported_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(IDENTITY_FILE), r#"{"version":99,"uuid":"x"}"#).unwrap();

    let result = NodeIdentity::load_or_create(dir.path());
    assert!(matches!(result, Err(IdentityError::UnsupportedVersion { found: 99, .. })));
}

#[test]
fn corrupt_identity_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(IDENTITY_FILE), "not json").unwrap();

    let result = NodeIdentity::load_or_create(dir.path());
    assert!(matches!(result, Err(IdentityError::Corrupt { .. })));
}
