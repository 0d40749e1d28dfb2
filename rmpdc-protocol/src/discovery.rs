use mdns_sd::{ServiceDaemon, ServiceEvent, ServiceInfo};
use rmpdc_core::discovery::{DiscoveredServer, DiscoveryCache};
use rmpdc_core::error::{Result, RmpdcError};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Service type announced by music player daemons
pub const MPD_SERVICE_TYPE: &str = "_mpd._tcp.local.";

pub const DEFAULT_BROWSE_TIMEOUT: Duration = Duration::from_secs(3);

const CACHE_TTL: Duration = Duration::from_secs(300);

/// Finds servers on the local network over mDNS
pub struct DiscoveryService {
    cache: Arc<RwLock<DiscoveryCache>>,
    mdns: ServiceDaemon,
    browse_timeout: Duration,
}

impl DiscoveryService {
    pub fn new(browse_timeout: Duration) -> Result<Arc<Self>> {
        let cache = Arc::new(RwLock::new(DiscoveryCache::new(CACHE_TTL)));
        let mdns = ServiceDaemon::new().map_err(|e| RmpdcError::Discovery(e.to_string()))?;

        Ok(Arc::new(Self {
            cache,
            mdns,
            browse_timeout,
        }))
    }

    /// Servers seen during the last scan, scanning again once the cache expires
    pub async fn scan(&self) -> Result<Vec<DiscoveredServer>> {
        {
            let cache = self.cache.read().await;
            if cache.is_valid() {
                debug!("Returning cached discovery results");
                return Ok(cache.get().to_vec());
            }
        }

        info!("Browsing for {} services", MPD_SERVICE_TYPE);
        let found = self.browse().await?;

        let mut cache = self.cache.write().await;
        cache.update(found);
        info!("Discovery complete, found {} servers", cache.get().len());
        Ok(cache.get().to_vec())
    }

    async fn browse(&self) -> Result<Vec<DiscoveredServer>> {
        let receiver = self
            .mdns
            .browse(MPD_SERVICE_TYPE)
            .map_err(|e| RmpdcError::Discovery(e.to_string()))?;
        let mut servers = Vec::new();
        let deadline = tokio::time::Instant::now() + self.browse_timeout;

        while tokio::time::Instant::now() < deadline {
            match tokio::time::timeout_at(deadline, Self::recv_async(receiver.clone())).await {
                Ok(Ok(ServiceEvent::ServiceResolved(info))) => {
                    if let Some(server) = server_from_info(&info) {
                        debug!("Resolved {}", server);
                        servers.push(server);
                    }
                }
                Ok(Ok(ServiceEvent::SearchStarted(_))) => {
                    debug!("Search started for {}", MPD_SERVICE_TYPE);
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    error!("Error receiving mDNS event: {}", e);
                    break;
                }
                // Deadline reached
                Err(_) => break,
            }
        }

        if let Err(e) = self.mdns.stop_browse(MPD_SERVICE_TYPE) {
            debug!("Failed to stop browsing: {}", e);
        }
        Ok(servers)
    }

    async fn recv_async(
        receiver: mdns_sd::Receiver<ServiceEvent>,
    ) -> std::result::Result<ServiceEvent, Box<dyn std::error::Error + Send + Sync>> {
        tokio::task::spawn_blocking(move || receiver.recv())
            .await
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
    }

    /// Forget cached results so the next scan browses again
    pub async fn refresh(&self) {
        self.cache.write().await.clear();
    }
}

fn server_from_info(info: &ServiceInfo) -> Option<DiscoveredServer> {
    let address = preferred_address(info.get_addresses().iter().copied())?;
    Some(DiscoveredServer {
        name: instance_name(info.get_fullname()).to_string(),
        hostname: address.to_string(),
        port: info.get_port(),
    })
}

/// First IPv4 address, falling back to IPv6
fn preferred_address(addresses: impl Iterator<Item = IpAddr>) -> Option<IpAddr> {
    let mut fallback = None;
    for address in addresses {
        if address.is_ipv4() {
            return Some(address);
        }
        fallback.get_or_insert(address);
    }
    fallback
}

/// Instance part of a full service name
fn instance_name(fullname: &str) -> &str {
    fullname
        .strip_suffix(MPD_SERVICE_TYPE)
        .and_then(|name| name.strip_suffix('.'))
        .unwrap_or(fullname)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_instance_name() {
        assert_eq!(instance_name("Living Room._mpd._tcp.local."), "Living Room");
        assert_eq!(instance_name("odd-name"), "odd-name");
    }

    #[test]
    fn test_prefers_ipv4() {
        let v6 = IpAddr::V6(Ipv6Addr::LOCALHOST);
        let v4 = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20));
        assert_eq!(preferred_address([v6, v4].into_iter()), Some(v4));
        assert_eq!(preferred_address([v6].into_iter()), Some(v6));
        assert_eq!(preferred_address(std::iter::empty()), None);
    }

    #[tokio::test]
    async fn test_discovery_service_creation() {
        let service = DiscoveryService::new(Duration::from_millis(10));
        assert!(service.is_ok());
    }
}
