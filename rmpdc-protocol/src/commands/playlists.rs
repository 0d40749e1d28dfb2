//! Stored playlists

use rmpdc_core::entity::{sort_by_name, Playlist};
use rmpdc_core::error::Result;
use rmpdc_core::song::Song;

use crate::command::{Command, CommandList};
use crate::connection::Connection;
use crate::response::{parse_playlists, parse_songs};

pub async fn playlists(connection: &mut Connection) -> Result<Vec<Playlist>> {
    let pairs = connection.run(&Command::new("listplaylists")).await?;
    let mut playlists = parse_playlists(&pairs)?;
    sort_by_name(&mut playlists);
    Ok(playlists)
}

/// Tracks with their metadata, in playlist order
pub async fn playlist_tracks(connection: &mut Connection, name: &str) -> Result<Vec<Song>> {
    let pairs = connection.run(&Command::new("listplaylistinfo").arg(name)).await?;
    parse_songs(&pairs)
}

/// Create an empty playlist
///
/// `save` stores the current queue, so the new playlist is cleared right after.
pub async fn create_playlist(connection: &mut Connection, name: &str) -> Result<()> {
    connection.run(&Command::new("save").arg(name)).await?;
    connection.run(&Command::new("playlistclear").arg(name)).await?;
    Ok(())
}

pub async fn delete_playlist(connection: &mut Connection, name: &str) -> Result<()> {
    connection.send(&Command::new("rm").arg(name)).await?;
    connection.read_ok().await
}

pub async fn rename_playlist(connection: &mut Connection, name: &str, new_name: &str) -> Result<()> {
    connection.send(&Command::new("rename").arg(name).arg(new_name)).await?;
    connection.read_ok().await
}

pub async fn playlist_add(connection: &mut Connection, name: &str, uri: &str) -> Result<()> {
    connection.send(&Command::new("playlistadd").arg(name).arg(uri)).await?;
    connection.read_ok().await
}

/// Remove the track at `position` (zero based)
pub async fn playlist_delete(connection: &mut Connection, name: &str, position: u32) -> Result<()> {
    connection.send(&Command::new("playlistdelete").arg(name).arg(position)).await?;
    connection.read_ok().await
}

/// Replace the queue with a playlist and start at `position`
pub async fn play_playlist(
    connection: &mut Connection,
    name: &str,
    shuffle: bool,
    repeat: bool,
    position: u32,
) -> Result<()> {
    let list: CommandList = [
        Command::new("clear"),
        Command::new("random").bool_arg(shuffle),
        Command::new("repeat").bool_arg(repeat),
        Command::new("load").arg(name),
        Command::new("play").arg(position),
    ]
    .into_iter()
    .collect();
    connection.run_list(&list).await?;
    Ok(())
}
