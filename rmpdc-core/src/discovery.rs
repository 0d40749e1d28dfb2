use std::fmt;
use std::time::{Duration, Instant};

use crate::config::ServerConfig;

/// A server announced on the local network
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscoveredServer {
    /// Service instance name (e.g., "Music Player Daemon on nas")
    pub name: String,
    /// Resolved address (e.g., "192.168.1.100")
    pub hostname: String,
    pub port: u16,
}

impl DiscoveredServer {
    /// Hostname and port are both needed before the entry can be used
    pub fn is_resolved(&self) -> bool {
        !self.hostname.trim().is_empty() && self.port != 0
    }

    pub fn to_server_config(&self) -> ServerConfig {
        ServerConfig {
            name: self.name.clone(),
            hostname: self.hostname.clone(),
            port: self.port,
            password: None,
        }
    }
}

impl fmt::Display for DiscoveredServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.name, self.hostname, self.port)
    }
}

/// Results of the last browse, trusted for `ttl`
#[derive(Debug)]
pub struct DiscoveryCache {
    servers: Vec<DiscoveredServer>,
    scanned_at: Option<Instant>,
    ttl: Duration,
}

impl DiscoveryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            servers: Vec::new(),
            scanned_at: None,
            ttl,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.scanned_at.is_some_and(|at| at.elapsed() < self.ttl)
    }

    /// Replace the cached list, dropping unresolved entries and duplicates
    pub fn update(&mut self, servers: Vec<DiscoveredServer>) {
        let mut unique: Vec<DiscoveredServer> = Vec::with_capacity(servers.len());
        for server in servers.into_iter().filter(DiscoveredServer::is_resolved) {
            if !unique.iter().any(|s| s.name == server.name) {
                unique.push(server);
            }
        }
        self.servers = unique;
        self.scanned_at = Some(Instant::now());
    }

    pub fn get(&self) -> &[DiscoveredServer] {
        &self.servers
    }

    pub fn clear(&mut self) {
        self.servers.clear();
        self.scanned_at = None;
    }
}
