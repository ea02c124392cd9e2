// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::application::DockerImage;

fn stop(name: &str) -> Action {
    Action::leaf(Primitive::StopApplication { app: Application::new(name, DockerImage::from_string("x")) })
}

#[test]
fn parallel_of_no_children_collapses_to_empty() {
    assert_eq!(Action::parallel(vec![]), Action::Empty);
}

#[test]
fn parallel_drops_empty_children_but_keeps_real_ones() {
    let action = Action::parallel(vec![Action::Empty, stop("web"), Action::Empty]);
    assert_eq!(action, Action::Parallel(vec![stop("web")]));
}

#[test]
fn sequential_of_only_empty_children_collapses_to_empty() {
    let action = Action::sequential(vec![Action::Empty, Action::Empty]);
    assert_eq!(action, Action::Empty);
}

#[test]
fn primitive_name_and_fields_identify_the_target() {
    let primitive = Primitive::StopApplication { app: Application::new("web", DockerImage::from_string("nginx:1.2")) };
    assert_eq!(primitive.name(), "stop_application");
    assert_eq!(primitive.fields(), vec![("application", "web".to_string())]);
}
