//! Play queue

use rmpdc_core::entity::Album;
use rmpdc_core::error::{Result, RmpdcError};
use rmpdc_core::song::Song;
use tracing::info;

use crate::command::{Command, CommandList};
use crate::commands::database::tracks_for_album;
use crate::connection::Connection;
use crate::response::parse_songs;

pub async fn queue(connection: &mut Connection) -> Result<Vec<Song>> {
    let pairs = connection.run(&Command::new("playlistinfo")).await?;
    parse_songs(&pairs)
}

pub async fn add(connection: &mut Connection, uri: &str) -> Result<()> {
    connection.send(&Command::new("add").arg(uri)).await?;
    connection.read_ok().await
}

pub async fn clear(connection: &mut Connection) -> Result<()> {
    connection.send(&Command::new("clear")).await?;
    connection.read_ok().await
}

pub async fn delete(connection: &mut Connection, position: u32) -> Result<()> {
    connection.send(&Command::new("delete").arg(position)).await?;
    connection.read_ok().await
}

/// Replace the queue with `tracks` and start playing
///
/// With `shuffle` playback starts at a random track and random mode is
/// switched on; `repeat` sets repeat mode.
pub async fn play_tracks(connection: &mut Connection, tracks: &[Song], shuffle: bool, repeat: bool) -> Result<()> {
    if tracks.is_empty() {
        return Err(RmpdcError::Argument("no tracks to play".to_owned()));
    }

    let mut list = CommandList::new();
    list.push(Command::new("clear"));
    for track in tracks {
        list.push(Command::new("add").arg(&track.uri));
    }
    list.push(Command::new("random").bool_arg(shuffle));
    list.push(Command::new("repeat").bool_arg(repeat));

    let start = if shuffle {
        rand::random_range(0..tracks.len())
    } else {
        0
    };
    list.push(Command::new("play").arg(start));

    connection.run_list(&list).await?;
    info!("Playing {} tracks from position {}", tracks.len(), start);
    Ok(())
}

pub async fn play_album(connection: &mut Connection, album: &Album, shuffle: bool, repeat: bool) -> Result<()> {
    let tracks = tracks_for_album(connection, album).await?;
    if tracks.is_empty() {
        return Err(RmpdcError::NotFound(format!("tracks of album '{}'", album.name)));
    }
    play_tracks(connection, &tracks, shuffle, repeat).await
}

/// Append every track of an album, returning how many were added
pub async fn add_album_to_queue(connection: &mut Connection, album: &Album) -> Result<usize> {
    let tracks = tracks_for_album(connection, album).await?;
    let list: CommandList = tracks
        .iter()
        .map(|track| Command::new("add").arg(&track.uri))
        .collect();
    connection.run_list(&list).await?;
    Ok(tracks.len())
}
