// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `NetworkDriver`: the capability interface `SetProxies`/`OpenPorts`
//! execute against. Unlike the other three external collaborators, this
//! trait is deliberately synchronous: real firewall/proxy manipulation is a
//! blocking syscall (iptables/nftables), a known defect in the upstream
//! system this crate does not repeat — callers are expected to run these
//! methods behind `tokio::task::spawn_blocking` rather than await them
//! directly. Ships only the in-memory reference driver; a real
//! iptables/nftables driver is an external collaborator outside this crate.

use convergence_core::application::{OpenPort, Proxy};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("proxy already exists for {0:?}")]
    ProxyAlreadyExists(Proxy),
    #[error("no such proxy: {0:?}")]
    NoSuchProxy(Proxy),
    #[error("port already open: {0:?}")]
    PortAlreadyOpen(OpenPort),
    #[error("port not open: {0:?}")]
    PortNotOpen(OpenPort),
}

pub trait NetworkDriver: Send + Sync + 'static {
    fn enumerate_proxies(&self) -> Result<Vec<Proxy>, NetworkError>;
    fn create_proxy_to(&self, remote_ip: &str, external_port: u16) -> Result<(), NetworkError>;
    fn delete_proxy(&self, proxy: &Proxy) -> Result<(), NetworkError>;

    fn enumerate_open_ports(&self) -> Result<Vec<OpenPort>, NetworkError>;
    fn open_port(&self, port: OpenPort) -> Result<(), NetworkError>;
    fn delete_open_port(&self, port: &OpenPort) -> Result<(), NetworkError>;

    fn enumerate_used_ports(&self) -> Result<Vec<OpenPort>, NetworkError>;
}

/// In-memory reference driver: the only `NetworkDriver` this crate ships.
#[derive(Clone, Default)]
pub struct InMemoryNetworkDriver {
    proxies: Arc<Mutex<HashSet<ProxyKey>>>,
    open_ports: Arc<Mutex<HashSet<u16>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ProxyKey {
    remote_ip: String,
    external_port: u16,
}

impl InMemoryNetworkDriver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NetworkDriver for InMemoryNetworkDriver {
    fn enumerate_proxies(&self) -> Result<Vec<Proxy>, NetworkError> {
        Ok(self
            .proxies
            .lock()
            .iter()
            .map(|p| Proxy { remote_ip: p.remote_ip.clone(), external_port: p.external_port })
            .collect())
    }

    fn create_proxy_to(&self, remote_ip: &str, external_port: u16) -> Result<(), NetworkError> {
        let key = ProxyKey { remote_ip: remote_ip.to_string(), external_port };
        let mut proxies = self.proxies.lock();
        if !proxies.insert(key) {
            return Err(NetworkError::ProxyAlreadyExists(Proxy {
                remote_ip: remote_ip.to_string(),
                external_port,
            }));
        }
        Ok(())
    }

    fn delete_proxy(&self, proxy: &Proxy) -> Result<(), NetworkError> {
        let key = ProxyKey { remote_ip: proxy.remote_ip.clone(), external_port: proxy.external_port };
        if !self.proxies.lock().remove(&key) {
            return Err(NetworkError::NoSuchProxy(proxy.clone()));
        }
        Ok(())
    }

    fn enumerate_open_ports(&self) -> Result<Vec<OpenPort>, NetworkError> {
        Ok(self.open_ports.lock().iter().map(|&external_port| OpenPort { external_port }).collect())
    }

    fn open_port(&self, port: OpenPort) -> Result<(), NetworkError> {
        if !self.open_ports.lock().insert(port.external_port) {
            return Err(NetworkError::PortAlreadyOpen(port));
        }
        Ok(())
    }

    fn delete_open_port(&self, port: &OpenPort) -> Result<(), NetworkError> {
        if !self.open_ports.lock().remove(&port.external_port) {
            return Err(NetworkError::PortNotOpen(*port));
        }
        Ok(())
    }

    fn enumerate_used_ports(&self) -> Result<Vec<OpenPort>, NetworkError> {
        self.enumerate_open_ports()
    }
}

#[cfg(test)]
#[path = "network_tests.rs"]
mod tests;
