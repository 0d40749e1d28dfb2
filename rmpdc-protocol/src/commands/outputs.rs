//! Audio output control

use rmpdc_core::error::{Result, RmpdcError};
use rmpdc_core::state::AudioOutput;
use tracing::info;

use crate::command::Command;
use crate::connection::Connection;
use crate::response::parse_outputs;

pub async fn outputs(connection: &mut Connection) -> Result<Vec<AudioOutput>> {
    let pairs = connection.run(&Command::new("outputs")).await?;
    parse_outputs(&pairs)
}

pub async fn enable_output(connection: &mut Connection, id: u32) -> Result<()> {
    connection.send(&Command::new("enableoutput").arg(id)).await?;
    connection.read_ok().await
}

pub async fn disable_output(connection: &mut Connection, id: u32) -> Result<()> {
    connection.send(&Command::new("disableoutput").arg(id)).await?;
    connection.read_ok().await
}

/// Flip an output and return its new state
pub async fn toggle_output(connection: &mut Connection, id: u32) -> Result<bool> {
    let output = outputs(connection)
        .await?
        .into_iter()
        .find(|o| o.id == id)
        .ok_or_else(|| RmpdcError::NotFound(format!("output {}", id)))?;

    if output.enabled {
        disable_output(connection, id).await?;
    } else {
        enable_output(connection, id).await?;
    }
    info!("Output '{}' {}", output.name, if output.enabled { "disabled" } else { "enabled" });
    Ok(!output.enabled)
}
