// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn volume_name_joins_namespace_and_id() {
    let d = Dataset::new("d1");
    assert_eq!(d.volume_name(), "default.d1");
}

#[test]
fn metadata_does_not_affect_dataset_id() {
    let mut a = Dataset::new("d1");
    a.metadata.insert("k".into(), "v".into());
    let b = Dataset::new("d1");
    assert_eq!(a.dataset_id, b.dataset_id);
    assert_ne!(a, b);
}

#[test]
fn manifestation_primary_constructor_sets_flag() {
    let m = Manifestation::primary(Dataset::new("d1"));
    assert!(m.primary);
    assert_eq!(m.dataset_id().as_str(), "d1");
}
