//! Session commands

use rmpdc_core::error::Result;
use tracing::debug;

use crate::command::Command;
use crate::connection::Connection;

pub async fn ping(connection: &mut Connection) -> Result<()> {
    connection.send(&Command::new("ping")).await?;
    connection.read_ok().await
}

pub async fn password(connection: &mut Connection, password: &str) -> Result<()> {
    connection.send(&Command::new("password").arg(password).sensitive()).await?;
    connection.read_ok().await
}

/// Raise the per-reply binary chunk size
///
/// Servers older than 0.22.4 do not know the command; they keep their
/// default chunk size and nothing is sent.
pub async fn binary_limit(connection: &mut Connection, limit: u32) -> Result<bool> {
    if !connection.version().at_least(0, 22, 4) {
        debug!("Server {} has no binarylimit support", connection.version());
        return Ok(false);
    }
    connection.send(&Command::new("binarylimit").arg(limit)).await?;
    connection.read_ok().await?;
    Ok(true)
}

pub async fn close(connection: &mut Connection) -> Result<()> {
    connection.close().await
}
