//! Playback control

use std::time::Duration;

use rmpdc_core::error::{Result, RmpdcError};
use rmpdc_core::state::{ConsumeMode, PlayerState, SingleMode};
use tracing::debug;

use crate::command::Command;
use crate::commands::status::status;
use crate::connection::Connection;

async fn simple(connection: &mut Connection, command: Command) -> Result<()> {
    connection.send(&command).await?;
    connection.read_ok().await
}

pub async fn play_position(connection: &mut Connection, position: u32) -> Result<()> {
    simple(connection, Command::new("play").arg(position)).await
}

/// Resume playback when stopped
pub async fn play(connection: &mut Connection) -> Result<()> {
    simple(connection, Command::new("play")).await
}

/// Pause when playing, resume when paused, start when stopped
pub async fn toggle_pause(connection: &mut Connection) -> Result<PlayerState> {
    let current = status(connection).await?.state;
    let next = match current {
        PlayerState::Play => {
            pause(connection, true).await?;
            PlayerState::Pause
        }
        PlayerState::Pause => {
            pause(connection, false).await?;
            PlayerState::Play
        }
        PlayerState::Stop => {
            play(connection).await?;
            PlayerState::Play
        }
    };
    debug!("Player state {} -> {}", current.as_str(), next.as_str());
    Ok(next)
}

pub async fn pause(connection: &mut Connection, paused: bool) -> Result<()> {
    simple(connection, Command::new("pause").bool_arg(paused)).await
}

pub async fn stop(connection: &mut Connection) -> Result<()> {
    simple(connection, Command::new("stop")).await
}

pub async fn next(connection: &mut Connection) -> Result<()> {
    simple(connection, Command::new("next")).await
}

pub async fn previous(connection: &mut Connection) -> Result<()> {
    simple(connection, Command::new("previous")).await
}

/// Seek within the current song
pub async fn seek(connection: &mut Connection, position: Duration) -> Result<()> {
    let seconds = format!("{:.3}", position.as_secs_f64());
    simple(connection, Command::new("seekcur").arg(seconds)).await
}

pub async fn set_volume(connection: &mut Connection, volume: u8) -> Result<()> {
    if volume > 100 {
        return Err(RmpdcError::Argument(format!("volume {} is out of range 0-100", volume)));
    }
    simple(connection, Command::new("setvol").arg(volume)).await
}

pub async fn set_random(connection: &mut Connection, random: bool) -> Result<()> {
    simple(connection, Command::new("random").bool_arg(random)).await
}

pub async fn set_repeat(connection: &mut Connection, repeat: bool) -> Result<()> {
    simple(connection, Command::new("repeat").bool_arg(repeat)).await
}

pub async fn set_single(connection: &mut Connection, mode: SingleMode) -> Result<()> {
    simple(connection, Command::new("single").arg(mode.as_arg())).await
}

pub async fn set_consume(connection: &mut Connection, mode: ConsumeMode) -> Result<()> {
    simple(connection, Command::new("consume").arg(mode.as_arg())).await
}
