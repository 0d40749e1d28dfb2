use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RmpdcError;

/// Metadata tags understood by `list`, `find` and filter expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagType {
    Artist,
    ArtistSort,
    Album,
    AlbumSort,
    AlbumArtist,
    AlbumArtistSort,
    Title,
    Track,
    Name,
    Genre,
    Date,
    OriginalDate,
    Composer,
    Performer,
    Comment,
    Disc,
    Label,
}

impl TagType {
    pub const ALL: [TagType; 17] = [
        TagType::Artist,
        TagType::ArtistSort,
        TagType::Album,
        TagType::AlbumSort,
        TagType::AlbumArtist,
        TagType::AlbumArtistSort,
        TagType::Title,
        TagType::Track,
        TagType::Name,
        TagType::Genre,
        TagType::Date,
        TagType::OriginalDate,
        TagType::Composer,
        TagType::Performer,
        TagType::Comment,
        TagType::Disc,
        TagType::Label,
    ];

    /// Name as it appears on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            TagType::Artist => "Artist",
            TagType::ArtistSort => "ArtistSort",
            TagType::Album => "Album",
            TagType::AlbumSort => "AlbumSort",
            TagType::AlbumArtist => "AlbumArtist",
            TagType::AlbumArtistSort => "AlbumArtistSort",
            TagType::Title => "Title",
            TagType::Track => "Track",
            TagType::Name => "Name",
            TagType::Genre => "Genre",
            TagType::Date => "Date",
            TagType::OriginalDate => "OriginalDate",
            TagType::Composer => "Composer",
            TagType::Performer => "Performer",
            TagType::Comment => "Comment",
            TagType::Disc => "Disc",
            TagType::Label => "Label",
        }
    }
}

impl FromStr for TagType {
    type Err = RmpdcError;

    /// Case-insensitive, like the server
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| RmpdcError::Argument(format!("unknown tag type: {}", s)))
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
