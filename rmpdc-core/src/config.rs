use crate::error::{Result, RmpdcError};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default = "default_servers", rename = "server")]
    pub servers: Vec<ServerConfig>,
    #[serde(default)]
    pub covers: CoverConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Name of the entry in `servers` used when none is given on the command line
    pub default_server: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// Read/write timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Requested size of binary chunks (`binarylimit`), server default when unset
    pub binary_limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerConfig {
    pub name: String,
    #[serde(default = "default_hostname")]
    pub hostname: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CoverConfig {
    #[serde(default = "default_cache_dir")]
    pub cache_directory: Utf8PathBuf,
    #[serde(default = "default_true")]
    pub disk_cache: bool,
    #[serde(default = "default_memory_cache_size")]
    pub memory_cache_size: usize,
    #[serde(default = "default_max_cover_size")]
    pub max_cover_size: usize,
    /// Optional HTTP server exposing `<music dir>/<album dir>/<cover_name>`
    pub web_server: Option<CoverWebServerConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CoverWebServerConfig {
    pub hostname: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
    #[serde(default = "default_cover_name")]
    pub cover_name: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_server: None,
            log_level: default_log_level(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            binary_limit: None,
        }
    }
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            cache_directory: default_cache_dir(),
            disk_cache: true,
            memory_cache_size: default_memory_cache_size(),
            max_cover_size: default_max_cover_size(),
            web_server: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "default".to_owned(),
            hostname: default_hostname(),
            port: default_port(),
            password: None,
        }
    }
}

// Default value functions
fn default_servers() -> Vec<ServerConfig> {
    vec![ServerConfig::default()]
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_timeout() -> u64 {
    10
}

fn default_hostname() -> String {
    "localhost".to_owned()
}

const fn default_port() -> u16 {
    6600
}

const fn default_web_port() -> u16 {
    80
}

fn default_cover_name() -> String {
    "cover.jpg".to_owned()
}

fn default_cache_dir() -> Utf8PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("rmpdc/covers"))
        .and_then(|p| Utf8PathBuf::try_from(p).ok())
        .unwrap_or_else(|| Utf8PathBuf::from("~/.cache/rmpdc/covers"))
}

fn default_true() -> bool {
    true
}

const fn default_memory_cache_size() -> usize {
    100
}

const fn default_max_cover_size() -> usize {
    16 * 1024 * 1024
}

impl ServerConfig {
    /// Apply `MPD_HOST` / `MPD_PORT` style overrides.
    ///
    /// `MPD_HOST` may carry a password as `password@host`.
    pub fn apply_overrides(&mut self, host: Option<&str>, port: Option<&str>) {
        if let Some(host) = host.filter(|h| !h.is_empty()) {
            // Split on the first '@'; one in first position names an abstract socket
            match host.split_once('@') {
                Some((password, hostname)) if !password.is_empty() => {
                    self.password = Some(password.to_owned());
                    self.hostname = hostname.to_owned();
                }
                _ => self.hostname = host.to_owned(),
            }
        }

        if let Some(port) = port {
            match port.parse::<u16>() {
                Ok(p) if p != 0 => self.port = p,
                _ => warn!("Ignoring invalid MPD_PORT value: {}", port),
            }
        }
    }

    /// Whether the hostname designates a local socket instead of a TCP host
    pub fn is_local_socket(&self) -> bool {
        self.hostname.starts_with('/') || self.hostname.starts_with('@')
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::find_config_file()?;
        Self::load_from_path(&config_path)
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| RmpdcError::Config(format!("Failed to read config: {}", e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)
            .map_err(|e| RmpdcError::Config(format!("Failed to parse config: {}", e)))?;

        config.expand_paths();
        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|_| Self::default())
    }

    fn find_config_file() -> Result<PathBuf> {
        let candidates = [
            dirs::config_dir().map(|p| p.join("rmpdc/rmpdc.toml")),
            Some(PathBuf::from("/etc/rmpdc/rmpdc.toml")),
        ];

        for candidate in candidates.into_iter().flatten() {
            if candidate.exists() {
                return Ok(candidate);
            }
        }

        Err(RmpdcError::Config("Config file not found".to_owned()))
    }

    fn expand_paths(&mut self) {
        fn expand_tilde(path: &Utf8PathBuf) -> Utf8PathBuf {
            let path_str = path.as_str();
            if path_str.starts_with("~/") {
                if let Some(home) = dirs::home_dir() {
                    if let Some(home_str) = home.to_str() {
                        return Utf8PathBuf::from(path_str.replacen("~", home_str, 1));
                    }
                }
            }
            path.clone()
        }

        self.covers.cache_directory = expand_tilde(&self.covers.cache_directory);
    }

    fn validate(&self) -> Result<()> {
        if self.servers.is_empty() {
            return Err(RmpdcError::Config("No server configured".to_owned()));
        }

        for (i, server) in self.servers.iter().enumerate() {
            if server.hostname.trim().is_empty() {
                return Err(RmpdcError::Config(format!("Server '{}' has an empty hostname", server.name)));
            }
            if server.port == 0 {
                return Err(RmpdcError::Config(format!("Server '{}' has an invalid port", server.name)));
            }
            if self.servers[..i].iter().any(|s| s.name == server.name) {
                return Err(RmpdcError::Config(format!("Duplicate server name: {}", server.name)));
            }
        }

        if let Some(name) = &self.general.default_server {
            if self.server(name).is_none() {
                return Err(RmpdcError::Config(format!("Default server '{}' is not defined", name)));
            }
        }

        if self.network.timeout == 0 {
            return Err(RmpdcError::Config("Timeout must be at least one second".to_owned()));
        }

        if let Some(web) = &self.covers.web_server {
            if web.hostname.trim().is_empty() || web.cover_name.trim().is_empty() {
                return Err(RmpdcError::Config(
                    "Cover web server needs a hostname and a cover name".to_owned(),
                ));
            }
        }

        Ok(())
    }

    pub fn server(&self, name: &str) -> Option<&ServerConfig> {
        self.servers.iter().find(|s| s.name == name)
    }

    /// Resolve the server to use: explicit name, then `default_server`, then the first entry
    pub fn select_server(&self, name: Option<&str>) -> Result<ServerConfig> {
        let wanted = name.or(self.general.default_server.as_deref());
        match wanted {
            Some(name) => self
                .server(name)
                .cloned()
                .ok_or_else(|| RmpdcError::NotFound(format!("server '{}'", name))),
            None => self
                .servers
                .first()
                .cloned()
                .ok_or_else(|| RmpdcError::Config("No server configured".to_owned())),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.network.timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            network: NetworkConfig::default(),
            servers: default_servers(),
            covers: CoverConfig::default(),
        }
    }
}
