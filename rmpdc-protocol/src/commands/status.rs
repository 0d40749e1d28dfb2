//! Player status and statistics

use rmpdc_core::error::Result;
use rmpdc_core::song::{AudioFormat, Song};
use rmpdc_core::state::{PlayerStatus, Stats};

use crate::command::Command;
use crate::connection::Connection;
use crate::response::FromPairs;

pub async fn status(connection: &mut Connection) -> Result<PlayerStatus> {
    let pairs = connection.run(&Command::new("status")).await?;
    PlayerStatus::from_pairs(&pairs)
}

/// The song being played, `None` with an empty queue or when stopped
pub async fn current_song(connection: &mut Connection) -> Result<Option<Song>> {
    let pairs = connection.run(&Command::new("currentsong")).await?;
    if pairs.is_empty() {
        return Ok(None);
    }
    Song::from_pairs(&pairs).map(Some)
}

pub async fn stats(connection: &mut Connection) -> Result<Stats> {
    let pairs = connection.run(&Command::new("stats")).await?;
    Stats::from_pairs(&pairs)
}

/// `None` when the server has no mixer
pub async fn volume(connection: &mut Connection) -> Result<Option<u8>> {
    Ok(status(connection).await?.volume)
}

pub async fn audio_format(connection: &mut Connection) -> Result<Option<AudioFormat>> {
    Ok(status(connection).await?.audio_format)
}
