// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Application, port, and network-routing types.

use crate::dataset::AttachedVolume;
use serde::{Deserialize, Serialize};

/// A container's declared port mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Port {
    pub internal_port: u16,
    pub external_port: u16,
}

/// A firewall hole on this node for `external_port`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OpenPort {
    pub external_port: u16,
}

/// Forwards traffic arriving on `external_port` on this node to `remote_ip`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Proxy {
    pub remote_ip: String,
    pub external_port: u16,
}

/// A docker-link-style binding from a local port to a remote application's port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub alias: String,
    pub local_port: u16,
    pub remote_port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestartPolicy {
    Never,
    Always,
    OnFailure { max_retry_count: Option<u32> },
}

impl Default for RestartPolicy {
    fn default() -> Self {
        RestartPolicy::Never
    }
}

/// A registry image reference, `name:tag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerImage {
    pub repository: String,
    pub tag: String,
}

impl DockerImage {
    pub fn new(repository: impl Into<String>, tag: impl Into<String>) -> Self {
        Self { repository: repository.into(), tag: tag.into() }
    }

    pub fn full_name(&self) -> String {
        format!("{}:{}", self.repository, self.tag)
    }

    /// Parse `"name:tag"`, defaulting to `"latest"` when no tag is present.
    pub fn from_string(image: &str) -> Self {
        match image.rsplit_once(':') {
            Some((repo, tag)) => Self::new(repo, tag),
            None => Self::new(image, "latest"),
        }
    }
}

/// A declared container to run: image, ports, links, optional volume,
/// resource limits, restart policy. `name` is unique within a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub name: String,
    pub image: DockerImage,
    #[serde(default)]
    pub ports: Vec<Port>,
    #[serde(default)]
    pub volume: Option<AttachedVolume>,
    #[serde(default)]
    pub links: Vec<Link>,
    /// Ordered name→value pairs; order is preserved for reproducibility and
    /// must be stable (sorted by key) so restart-detection by structural
    /// equality isn't destabilised by discovery's iteration order.
    #[serde(default)]
    pub environment: Vec<(String, String)>,
    #[serde(default)]
    pub memory_limit: Option<u64>,
    #[serde(default)]
    pub cpu_shares: Option<u32>,
    #[serde(default)]
    pub restart_policy: RestartPolicy,
    /// Transient, observed from the runtime; never part of desired config.
    #[serde(default)]
    pub running: bool,
}

impl Application {
    pub fn new(name: impl Into<String>, image: DockerImage) -> Self {
        Self {
            name: name.into(),
            image,
            ports: Vec::new(),
            volume: None,
            links: Vec::new(),
            environment: Vec::new(),
            memory_limit: None,
            cpu_shares: None,
            restart_policy: RestartPolicy::Never,
            running: false,
        }
    }

    /// Sort `environment` by key. Discovery must call this before comparing
    /// against desired state, since iteration order from the runtime's
    /// environment mapping is not guaranteed stable.
    pub fn with_sorted_environment(mut self) -> Self {
        self.environment.sort_by(|a, b| a.0.cmp(&b.0));
        self
    }

    /// Desired state never originates from discovery, so it may still carry
    /// dataset `metadata`; current (observed) state never does. Comparing
    /// the two directly would make every running application appear drifted.
    /// Strip metadata before the structural-equality check used to decide
    /// whether a running application needs a restart.
    pub fn normalized_for_comparison(&self) -> Application {
        let mut app = self.clone();
        if let Some(volume) = app.volume.as_mut() {
            volume.manifestation.dataset.metadata.clear();
        }
        // `running` is transient observed state, never part of the
        // declared spec; ignore it when deciding whether a restart is due
        // to a spec change versus a liveness change (those are handled by
        // separate buckets in the planner).
        app.running = false;
        // A discovered unit's environment still carries the `_ADDR`/`_PROTO`
        // lines `encode_link` baked in for each of its own links; a desired
        // copy never does (those are baked only at start time). Discount
        // them here too, or every application with a link would appear
        // permanently drifted against its own declared spec.
        let derived: std::collections::HashSet<String> =
            app.links.iter().flat_map(crate::link_env::derived_env_keys).collect();
        app.environment.retain(|(key, _)| !derived.contains(key));
        app
    }
}

#[cfg(test)]
#[path = "application_tests.rs"]
mod tests;
