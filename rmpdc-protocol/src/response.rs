//! Typed views over `key: value` responses

use bytes::Bytes;
use rmpdc_core::entity::Playlist;
use rmpdc_core::error::{Result, RmpdcError};
use rmpdc_core::song::{AudioFormat, Song};
use rmpdc_core::state::{AudioOutput, PlayerStatus, QueuePosition, Stats};
use rmpdc_core::tag::TagType;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub key: String,
    pub value: String,
}

impl Pair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One chunk of a binary transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryChunk {
    /// Total size of the object, when the server announces it
    pub size: Option<u64>,
    pub mime_type: Option<String>,
    pub data: Bytes,
}

/// Build a value from the pairs of a single response entity
pub trait FromPairs: Sized {
    fn from_pairs(pairs: &[Pair]) -> Result<Self>;
}

fn parse_value<T: FromStr>(pair: &Pair) -> Result<T> {
    pair.value
        .parse()
        .map_err(|_| RmpdcError::Protocol(format!("invalid value for '{}': {:?}", pair.key, pair.value)))
}

fn parse_seconds(pair: &Pair) -> Result<Duration> {
    let secs: f64 = parse_value(pair)?;
    Duration::try_from_secs_f64(secs)
        .map_err(|_| RmpdcError::Protocol(format!("invalid duration for '{}': {}", pair.key, pair.value)))
}

/// Track and disc tags look like `3` or `3/12`
fn parse_number_prefix(value: &str) -> Option<u32> {
    value.split('/').next().and_then(|n| n.trim().parse().ok())
}

/// Group pairs into entities, starting a new one at every delimiter key
pub fn split_entities<'a>(pairs: &'a [Pair], delimiters: &[&str]) -> Vec<&'a [Pair]> {
    let mut groups = Vec::new();
    let mut start = None;
    for (i, pair) in pairs.iter().enumerate() {
        if delimiters.contains(&pair.key.as_str()) {
            if let Some(s) = start {
                groups.push(&pairs[s..i]);
            }
            start = Some(i);
        }
    }
    if let Some(s) = start {
        groups.push(&pairs[s..]);
    }
    groups
}

/// Values of one tag in a `list` response, in server order
pub fn tag_values(pairs: &[Pair], tag: TagType) -> Vec<String> {
    pairs
        .iter()
        .filter(|p| p.key.eq_ignore_ascii_case(tag.as_str()))
        .map(|p| p.value.clone())
        .collect()
}

/// First value of a key, if present
pub fn find_value<'a>(pairs: &'a [Pair], key: &str) -> Option<&'a str> {
    pairs.iter().find(|p| p.key == key).map(|p| p.value.as_str())
}

/// Songs of a listing, skipping directory and playlist entries
pub fn parse_songs(pairs: &[Pair]) -> Result<Vec<Song>> {
    split_entities(pairs, &["file", "directory", "playlist"])
        .into_iter()
        .filter(|group| group[0].key == "file")
        .map(Song::from_pairs)
        .collect()
}

pub fn parse_playlists(pairs: &[Pair]) -> Result<Vec<Playlist>> {
    Ok(split_entities(pairs, &["playlist"])
        .into_iter()
        .map(|group| Playlist {
            name: group[0].value.clone(),
            last_modified: find_value(group, "Last-Modified").map(String::from),
        })
        .collect())
}

pub fn parse_outputs(pairs: &[Pair]) -> Result<Vec<AudioOutput>> {
    split_entities(pairs, &["outputid"])
        .into_iter()
        .map(AudioOutput::from_pairs)
        .collect()
}

impl FromPairs for Song {
    fn from_pairs(pairs: &[Pair]) -> Result<Self> {
        let mut song = Song::default();
        let mut has_file = false;

        for pair in pairs {
            let value = || Some(pair.value.clone());
            match pair.key.as_str() {
                "file" => {
                    song.uri = pair.value.clone();
                    has_file = true;
                }
                "Title" => song.title = value(),
                "Artist" => song.artist = value(),
                "Album" => song.album = value(),
                "AlbumArtist" => song.album_artist = value(),
                "Track" => song.track = parse_number_prefix(&pair.value),
                "Disc" => song.disc = parse_number_prefix(&pair.value),
                "Date" => song.date = value(),
                "Genre" => song.genre = value(),
                "Composer" => song.composer = value(),
                "Performer" => song.performer = value(),
                "Comment" => song.comment = value(),
                "Pos" => song.position = Some(parse_value(pair)?),
                "Id" => song.id = Some(parse_value(pair)?),
                "Last-Modified" => song.last_modified = value(),
                "Format" => song.format = pair.value.parse().ok(),
                "duration" => song.duration = Some(parse_seconds(pair)?),
                // Integer seconds, superseded by "duration"
                "Time" => {
                    if song.duration.is_none() {
                        song.duration = Some(Duration::from_secs(parse_value(pair)?));
                    }
                }
                other => debug!("Ignoring song field: {}", other),
            }
        }

        if !has_file {
            return Err(RmpdcError::Protocol("song entry without 'file'".to_owned()));
        }
        Ok(song)
    }
}

impl FromPairs for PlayerStatus {
    fn from_pairs(pairs: &[Pair]) -> Result<Self> {
        let mut status = PlayerStatus::default();
        let mut song_pos = None;
        let mut song_id = None;
        let mut next_pos = None;
        let mut next_id = None;
        let mut legacy_total = None;

        for pair in pairs {
            match pair.key.as_str() {
                "state" => status.state = pair.value.parse()?,
                "volume" => {
                    let volume: i32 = parse_value(pair)?;
                    status.volume = u8::try_from(volume).ok();
                }
                "repeat" => status.repeat = pair.value == "1",
                "random" => status.random = pair.value == "1",
                "single" => status.single = pair.value.parse()?,
                "consume" => status.consume = pair.value.parse()?,
                "playlist" => status.playlist_version = parse_value(pair)?,
                "playlistlength" => status.playlist_length = parse_value(pair)?,
                "song" => song_pos = Some(parse_value(pair)?),
                "songid" => song_id = Some(parse_value(pair)?),
                "nextsong" => next_pos = Some(parse_value(pair)?),
                "nextsongid" => next_id = Some(parse_value(pair)?),
                "elapsed" => status.elapsed = Some(parse_seconds(pair)?),
                "duration" => status.duration = Some(parse_seconds(pair)?),
                "time" => {
                    legacy_total = pair
                        .value
                        .split_once(':')
                        .and_then(|(_, total)| total.parse::<u64>().ok());
                }
                "bitrate" => {
                    let bitrate: u32 = parse_value(pair)?;
                    status.bitrate = (bitrate > 0).then_some(bitrate);
                }
                "audio" => status.audio_format = pair.value.parse::<AudioFormat>().ok(),
                "xfade" => status.crossfade = parse_value(pair)?,
                "updating_db" => status.updating_db = Some(parse_value(pair)?),
                "partition" => status.partition = Some(pair.value.clone()),
                "error" => status.error = Some(pair.value.clone()),
                _ => {}
            }
        }

        if status.duration.is_none() {
            status.duration = legacy_total.map(Duration::from_secs);
        }
        if let (Some(position), Some(id)) = (song_pos, song_id) {
            status.current_song = Some(QueuePosition { position, id });
        }
        if let (Some(position), Some(id)) = (next_pos, next_id) {
            status.next_song = Some(QueuePosition { position, id });
        }
        Ok(status)
    }
}

impl FromPairs for Stats {
    fn from_pairs(pairs: &[Pair]) -> Result<Self> {
        let mut stats = Stats::default();
        for pair in pairs {
            match pair.key.as_str() {
                "artists" => stats.artists = parse_value(pair)?,
                "albums" => stats.albums = parse_value(pair)?,
                "songs" => stats.songs = parse_value(pair)?,
                "uptime" => stats.uptime = Duration::from_secs(parse_value(pair)?),
                "playtime" => stats.playtime = Duration::from_secs(parse_value(pair)?),
                "db_playtime" => stats.db_playtime = Duration::from_secs(parse_value(pair)?),
                "db_update" => stats.db_update = parse_value(pair)?,
                _ => {}
            }
        }
        Ok(stats)
    }
}

impl FromPairs for AudioOutput {
    fn from_pairs(pairs: &[Pair]) -> Result<Self> {
        let mut id = None;
        let mut name = None;
        let mut plugin = None;
        let mut enabled = false;
        for pair in pairs {
            match pair.key.as_str() {
                "outputid" => id = Some(parse_value(pair)?),
                "outputname" => name = Some(pair.value.clone()),
                "plugin" => plugin = Some(pair.value.clone()),
                "outputenabled" => enabled = pair.value == "1",
                _ => {}
            }
        }

        match (id, name) {
            (Some(id), Some(name)) => Ok(AudioOutput {
                id,
                name,
                plugin,
                enabled,
            }),
            _ => Err(RmpdcError::Protocol("output entry without id or name".to_owned())),
        }
    }
}
