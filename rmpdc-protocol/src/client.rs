//! A connection bound to a configured server
//!
//! `Client` authenticates and applies session settings on connect, then
//! dereferences to its [`Connection`] so every command function accepts it.

use std::ops::{Deref, DerefMut};
use std::time::Duration;

use rmpdc_core::config::{Config, ServerConfig};
use rmpdc_core::error::Result;
use tracing::{debug, info};

use crate::commands::connection::{binary_limit, password};
use crate::connection::Connection;

#[derive(Debug)]
pub struct Client {
    connection: Connection,
    server: ServerConfig,
}

impl Client {
    /// Connect, then send the password when one is configured
    pub async fn connect(server: &ServerConfig, timeout: Duration) -> Result<Self> {
        let mut connection = Connection::connect(&server.hostname, server.port, timeout).await?;

        if let Some(secret) = server.password.as_deref() {
            password(&mut connection, secret).await?;
            debug!("Authenticated with {}", server.name);
        }

        info!(
            "Connected to {} ({}, protocol {})",
            server.name,
            connection.peer(),
            connection.version()
        );
        Ok(Self {
            connection,
            server: server.clone(),
        })
    }

    /// Connect to the selected server with the network settings of `config`
    pub async fn from_config(config: &Config, server: &ServerConfig) -> Result<Self> {
        let mut client = Self::connect(server, config.timeout()).await?;
        if let Some(limit) = config.network.binary_limit {
            binary_limit(&mut client, limit).await?;
        }
        Ok(client)
    }

    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    pub fn connection(&mut self) -> &mut Connection {
        &mut self.connection
    }

    pub async fn disconnect(mut self) -> Result<()> {
        debug!("Disconnecting from {}", self.server.name);
        self.connection.close().await
    }
}

impl Deref for Client {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.connection
    }
}

impl DerefMut for Client {
    fn deref_mut(&mut self) -> &mut Connection {
        &mut self.connection
    }
}
