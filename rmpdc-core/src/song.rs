use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::RmpdcError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Song {
    /// Path relative to the music directory, or a stream URL
    pub uri: String,
    pub duration: Option<Duration>,

    // Core metadata
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub track: Option<u32>,
    pub disc: Option<u32>,
    pub date: Option<String>,
    pub genre: Option<String>,
    pub composer: Option<String>,
    pub performer: Option<String>,
    pub comment: Option<String>,

    // Queue placement, only set for queue listings
    pub position: Option<u32>,
    pub id: Option<u32>,

    pub last_modified: Option<String>,
    pub format: Option<AudioFormat>,
}

impl Song {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    /// Title tag, or the file name without its extension
    pub fn display_title(&self) -> &str {
        if let Some(title) = self.title.as_deref() {
            return title;
        }
        let file_name = self.uri.rsplit('/').next().unwrap_or(&self.uri);
        match file_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => file_name,
        }
    }

    pub fn display_artist(&self) -> &str {
        self.artist
            .as_deref()
            .or(self.album_artist.as_deref())
            .unwrap_or("Unknown Artist")
    }

    pub fn display_album(&self) -> &str {
        self.album.as_deref().unwrap_or("Unknown Album")
    }

    /// Directory part of the URI, empty for songs at the root
    pub fn directory(&self) -> &str {
        match self.uri.rsplit_once('/') {
            Some((dir, _)) => dir,
            None => "",
        }
    }

    /// Remote streams have a URL scheme instead of a library path
    pub fn is_remote(&self) -> bool {
        self.uri.contains("://")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    pub sample_rate: u32,
    /// 32 for floating point samples
    pub bits_per_sample: u8,
    pub channels: u8,
    pub float: bool,
}

impl AudioFormat {
    pub fn new(sample_rate: u32, channels: u8, bits_per_sample: u8) -> Self {
        Self {
            sample_rate,
            bits_per_sample,
            channels,
            float: false,
        }
    }
}

impl FromStr for AudioFormat {
    type Err = RmpdcError;

    /// Parses `samplerate:bits:channels`, e.g. `44100:16:2` or `48000:f:2`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RmpdcError::Protocol(format!("invalid audio format: {}", s));

        let mut parts = s.split(':');
        let (Some(rate), Some(bits), Some(channels), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        let sample_rate = rate.parse().map_err(|_| invalid())?;
        let (bits_per_sample, float) = match bits {
            "f" => (32, true),
            other => (other.parse().map_err(|_| invalid())?, false),
        };
        let channels = channels.parse().map_err(|_| invalid())?;

        Ok(Self {
            sample_rate,
            bits_per_sample,
            channels,
            float,
        })
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.float {
            write!(f, "{}:f:{}", self.sample_rate, self.channels)
        } else {
            write!(f, "{}:{}:{}", self.sample_rate, self.bits_per_sample, self.channels)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_title_falls_back_to_file_stem() {
        let song = Song::new("Artist/Album/01 - Intro.flac");
        assert_eq!(song.display_title(), "01 - Intro");
        assert_eq!(song.directory(), "Artist/Album");
        assert_eq!(song.display_artist(), "Unknown Artist");
    }

    #[test]
    fn test_root_song_directory() {
        let song = Song::new("loose.mp3");
        assert_eq!(song.directory(), "");
        assert!(!song.is_remote());
        assert!(Song::new("http://radio.example/stream").is_remote());
    }

    #[test]
    fn test_audio_format_parse() {
        let fmt: AudioFormat = "44100:16:2".parse().unwrap();
        assert_eq!(fmt, AudioFormat::new(44100, 2, 16));
        assert_eq!(fmt.to_string(), "44100:16:2");

        let float: AudioFormat = "48000:f:2".parse().unwrap();
        assert!(float.float);
        assert_eq!(float.bits_per_sample, 32);
        assert_eq!(float.to_string(), "48000:f:2");

        assert!("44100:16".parse::<AudioFormat>().is_err());
        assert!("dsd64:1:2:3".parse::<AudioFormat>().is_err());
    }
}
