//! HTTP fallback serving cover files from the music directory
//!
//! Many setups export the music directory over HTTP. A cover for the album in
//! `Artist/Album` is then found at `<base>/Artist/Album/<cover_name>`.

use std::time::Duration;

use reqwest::{StatusCode, Url};
use rmpdc_core::config::{CoverConfig, CoverWebServerConfig};
use rmpdc_core::error::{Result, RmpdcError};
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct CoverWebServer {
    base: Url,
    cover_name: String,
    max_size: usize,
    client: reqwest::Client,
}

impl CoverWebServer {
    /// A hostname without a scheme gets `https` on port 443 and `http`
    /// otherwise. The port is spelled out unless it is 80 or 443, also for
    /// a hostname that carries its own scheme but no port.
    pub fn new(hostname: &str, port: u16, cover_name: impl Into<String>) -> Result<Self> {
        let cover_name = cover_name.into();
        if cover_name.trim().is_empty() {
            return Err(RmpdcError::Config("Cover server needs a cover file name".to_owned()));
        }
        let base = base_url(hostname, port)?;

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RmpdcError::Cover(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base,
            cover_name,
            max_size: usize::MAX,
            client,
        })
    }

    pub fn from_config(web: &CoverWebServerConfig, covers: &CoverConfig) -> Result<Self> {
        Ok(Self::new(&web.hostname, web.port, web.cover_name.clone())?.with_max_size(covers.max_cover_size))
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// URL of the cover file inside `directory`, each segment percent-encoded
    pub fn cover_url_for_path(&self, directory: &str) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| RmpdcError::Cover(format!("Cover server URL {} cannot hold a path", self.base)))?
            .pop_if_empty()
            .extend(directory.split('/').filter(|segment| !segment.is_empty()))
            .push(&self.cover_name);
        Ok(url)
    }

    /// Download the cover for `directory`; a 404 or an empty body is `None`
    pub async fn fetch(&self, directory: &str) -> Result<Option<Vec<u8>>> {
        let url = self.cover_url_for_path(directory)?;
        debug!("Fetching cover from {}", url);

        let res = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| RmpdcError::Cover(format!("Failed to fetch {}: {}", url, e)))?;

        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !res.status().is_success() {
            return Err(RmpdcError::Cover(format!("{} returned status {}", url, res.status())));
        }
        match res.content_length() {
            Some(len) if len > self.max_size as u64 => {
                return Err(RmpdcError::Cover(format!("Cover at {} too large: {} bytes", url, len)));
            }
            _ => {}
        }

        let body = res
            .bytes()
            .await
            .map_err(|e| RmpdcError::Cover(format!("Failed to read body from {}: {}", url, e)))?;
        if body.len() > self.max_size {
            return Err(RmpdcError::Cover(format!("Cover at {} too large: {} bytes", url, body.len())));
        }

        Ok((!body.is_empty()).then(|| body.to_vec()))
    }
}

fn base_url(hostname: &str, port: u16) -> Result<Url> {
    let hostname = hostname.trim();
    if hostname.is_empty() {
        return Err(RmpdcError::Config("Cover server hostname is empty".to_owned()));
    }

    let raw = if hostname.contains("://") {
        hostname.to_owned()
    } else {
        let scheme = if port == 443 { "https" } else { "http" };
        format!("{}://{}", scheme, hostname)
    };
    let invalid = |reason: &str| RmpdcError::Config(format!("Invalid cover server URL {}: {}", raw, reason));

    let mut url = Url::parse(&raw).map_err(|e| invalid(&e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("cannot hold a path"));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("no host"));
    }
    // An explicit port in the hostname wins; set_port drops the scheme default
    if url.port().is_none() && port != 80 && port != 443 {
        url.set_port(Some(port)).map_err(|()| invalid("cannot carry a port"))?;
    }
    Ok(url)
}
