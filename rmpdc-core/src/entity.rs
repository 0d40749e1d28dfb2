//! Library entities built from tag listings
//!
//! Albums, artists and genres are not first-class objects on the server;
//! they are reconstructed from `list` results and sorted the way a music
//! browser presents them.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::tag::TagType;

/// Punctuation ignored at both ends of a name when sorting
const SORT_TRIM_CHARS: &[char] = &['.', '?', '!', ':', ';', '/', '+', '=', '-', '*', '\'', '"'];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub name: String,
    /// Album artist when known
    pub artist: Option<String>,
    pub date: Option<String>,
    pub genre: Option<String>,
    /// Directory holding the album's files, resolved lazily
    pub path: Option<String>,
}

impl Album {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Genre {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub name: String,
    pub last_modified: Option<String>,
}

/// What a library listing is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Albums,
    Artists,
    AlbumArtists,
    Genres,
    Playlists,
}

impl EntityKind {
    /// Tag listed for this kind; playlists are not tag based
    pub fn tag(self) -> Option<TagType> {
        match self {
            EntityKind::Albums => Some(TagType::Album),
            EntityKind::Artists => Some(TagType::Artist),
            EntityKind::AlbumArtists => Some(TagType::AlbumArtist),
            EntityKind::Genres => Some(TagType::Genre),
            EntityKind::Playlists => None,
        }
    }
}

/// A single listing row of any kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Entity {
    Album(Album),
    Artist(Artist),
    Genre(Genre),
    Playlist(Playlist),
}

impl Entity {
    pub fn name(&self) -> &str {
        match self {
            Entity::Album(a) => &a.name,
            Entity::Artist(a) => &a.name,
            Entity::Genre(g) => &g.name,
            Entity::Playlist(p) => &p.name,
        }
    }
}

/// Named things that can be sorted with [`compare_names`]
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for Album {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Artist {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Genre {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Playlist {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Entity {
    fn name(&self) -> &str {
        Entity::name(self)
    }
}

pub fn sort_key(name: &str) -> &str {
    name.trim_matches(SORT_TRIM_CHARS)
}

pub fn compare_names(a: &str, b: &str) -> Ordering {
    sort_key(a).cmp(sort_key(b))
}

pub fn sort_by_name<T: Named>(items: &mut [T]) {
    items.sort_by(|a, b| compare_names(a.name(), b.name()));
}
