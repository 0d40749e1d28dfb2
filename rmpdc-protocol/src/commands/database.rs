//! Library queries
//!
//! Albums, artists and genres are assembled from `list` results; songs come
//! from `find`/`search`. Every listing is returned sorted by name.

use rmpdc_core::entity::{sort_by_name, Album, Artist, Entity, EntityKind, Genre};
use rmpdc_core::error::{Result, RmpdcError};
use rmpdc_core::song::Song;
use rmpdc_core::tag::TagType;
use tracing::debug;

use crate::command::Command;
use crate::commands::playlists;
use crate::connection::Connection;
use crate::filter::Filter;
use crate::response::{find_value, parse_songs, split_entities, tag_values, FromPairs};

/// One row of a directory listing
#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryEntry {
    Directory(String),
    Song(Song),
    Playlist(String),
}

impl DirectoryEntry {
    pub fn path(&self) -> &str {
        match self {
            DirectoryEntry::Directory(path) | DirectoryEntry::Playlist(path) => path,
            DirectoryEntry::Song(song) => &song.uri,
        }
    }
}

/// Distinct non-empty values of `tag`, optionally restricted by a filter
async fn list_tag(connection: &mut Connection, tag: TagType, filter: Option<&Filter>) -> Result<Vec<String>> {
    let command = Command::new("list")
        .arg(tag)
        .opt_arg(filter.filter(|f| !f.is_empty()).map(Filter::to_expression));
    let pairs = connection.run(&command).await?;

    let mut values = tag_values(&pairs, tag);
    values.retain(|v| !v.is_empty());
    values.dedup();
    Ok(values)
}

pub async fn list_entities(connection: &mut Connection, kind: EntityKind) -> Result<Vec<Entity>> {
    let Some(tag) = kind.tag() else {
        let playlists = playlists::playlists(connection).await?;
        return Ok(playlists.into_iter().map(Entity::Playlist).collect());
    };

    let mut entities: Vec<Entity> = list_tag(connection, tag, None)
        .await?
        .into_iter()
        .map(|name| match kind {
            EntityKind::Albums => Entity::Album(Album::new(name)),
            EntityKind::Genres => Entity::Genre(Genre { name }),
            _ => Entity::Artist(Artist { name }),
        })
        .collect();
    sort_by_name(&mut entities);
    debug!("Listed {} entities of kind {:?}", entities.len(), kind);
    Ok(entities)
}

pub async fn albums_for_genre(connection: &mut Connection, genre: &str) -> Result<Vec<Album>> {
    let filter = Filter::new().tag_eq(TagType::Genre, genre);
    let mut albums: Vec<Album> = list_tag(connection, TagType::Album, Some(&filter))
        .await?
        .into_iter()
        .map(|name| Album {
            genre: Some(genre.to_owned()),
            ..Album::new(name)
        })
        .collect();
    sort_by_name(&mut albums);
    Ok(albums)
}

/// Albums of an artist, matched on `AlbumArtist` or `Artist`
pub async fn albums_for_artist(connection: &mut Connection, artist: &str, album_artist: bool) -> Result<Vec<Album>> {
    let tag = if album_artist {
        TagType::AlbumArtist
    } else {
        TagType::Artist
    };
    let filter = Filter::new().tag_eq(tag, artist);
    let mut albums: Vec<Album> = list_tag(connection, TagType::Album, Some(&filter))
        .await?
        .into_iter()
        .map(|name| Album::new(name).with_artist(artist))
        .collect();
    sort_by_name(&mut albums);
    Ok(albums)
}

pub async fn artists_for_genre(connection: &mut Connection, genre: &str, album_artist: bool) -> Result<Vec<Artist>> {
    let tag = if album_artist {
        TagType::AlbumArtist
    } else {
        TagType::Artist
    };
    let filter = Filter::new().tag_eq(TagType::Genre, genre);
    let mut artists: Vec<Artist> = list_tag(connection, tag, Some(&filter))
        .await?
        .into_iter()
        .map(|name| Artist { name })
        .collect();
    sort_by_name(&mut artists);
    Ok(artists)
}

fn album_filter(album: &Album) -> Filter {
    let filter = Filter::new().tag_eq(TagType::Album, &album.name);
    match album.artist.as_deref() {
        Some(artist) if !artist.is_empty() => filter.tag_eq(TagType::AlbumArtist, artist),
        _ => filter,
    }
}

/// Directory holding the first track of an album
pub async fn path_for_album(connection: &mut Connection, album: &Album) -> Result<String> {
    if let Some(path) = album.path.as_deref() {
        return Ok(path.to_owned());
    }

    let filter = Filter::new().tag_eq(TagType::Album, &album.name);
    let command = Command::new("find").arg(filter.to_expression()).arg("window").arg("0:1");
    let pairs = connection.run(&command).await?;
    let song = parse_songs(&pairs)?
        .into_iter()
        .next()
        .ok_or_else(|| RmpdcError::NotFound(format!("album '{}'", album.name)))?;
    Ok(song.directory().to_owned())
}

/// Tracks of an album in disc and track order
pub async fn tracks_for_album(connection: &mut Connection, album: &Album) -> Result<Vec<Song>> {
    let mut tracks = find(connection, &album_filter(album)).await?;
    tracks.sort_by_key(|song| (song.disc.unwrap_or(0), song.track.unwrap_or(0)));
    Ok(tracks)
}

/// Fill in album artist, year and genre
pub async fn album_metadata(connection: &mut Connection, album: &Album) -> Result<Album> {
    let filter = Filter::new().tag_eq(TagType::Album, &album.name);
    let mut result = album.clone();

    if result.artist.is_none() {
        result.artist = list_tag(connection, TagType::AlbumArtist, Some(&filter))
            .await?
            .into_iter()
            .next();
    }

    result.date = list_tag(connection, TagType::Date, Some(&filter))
        .await?
        .into_iter()
        .next()
        .map(|date| date.chars().take(4).collect());

    result.genre = list_tag(connection, TagType::Genre, Some(&filter))
        .await?
        .into_iter()
        .next();

    Ok(result)
}

/// Exact match
pub async fn find(connection: &mut Connection, filter: &Filter) -> Result<Vec<Song>> {
    if filter.is_empty() {
        return Err(RmpdcError::Argument("find needs at least one constraint".to_owned()));
    }
    let pairs = connection.run(&Command::new("find").arg(filter.to_expression())).await?;
    parse_songs(&pairs)
}

/// Case-insensitive match
pub async fn search(connection: &mut Connection, filter: &Filter) -> Result<Vec<Song>> {
    if filter.is_empty() {
        return Err(RmpdcError::Argument("search needs at least one constraint".to_owned()));
    }
    let pairs = connection.run(&Command::new("search").arg(filter.to_expression())).await?;
    parse_songs(&pairs)
}

fn is_hidden(path: &str) -> bool {
    path.rsplit('/').next().is_some_and(|name| name.starts_with('.'))
}

/// Contents of a directory, the root when `path` is `None`
pub async fn list_directory(connection: &mut Connection, path: Option<&str>) -> Result<Vec<DirectoryEntry>> {
    let pairs = connection.run(&Command::new("lsinfo").opt_arg(path)).await?;
    split_entities(&pairs, &["directory", "file", "playlist"])
        .into_iter()
        .filter(|group| !is_hidden(&group[0].value))
        .map(|group| match group[0].key.as_str() {
            "directory" => Ok(DirectoryEntry::Directory(group[0].value.clone())),
            "playlist" => Ok(DirectoryEntry::Playlist(group[0].value.clone())),
            _ => Song::from_pairs(group).map(DirectoryEntry::Song),
        })
        .collect()
}

/// Start a database update and return its job id
pub async fn update(connection: &mut Connection, path: Option<&str>) -> Result<u32> {
    let pairs = connection.run(&Command::new("update").opt_arg(path)).await?;
    let job = find_value(&pairs, "updating_db")
        .ok_or_else(|| RmpdcError::Protocol("update reply without a job id".to_owned()))?;
    job.parse()
        .map_err(|_| RmpdcError::Protocol(format!("invalid update job id: {}", job)))
}
