//! Shared test utilities for the rmpdc workspace
//!
//! Only available when the "test-utils" feature is enabled.

use crate::song::Song;
use std::time::Duration;

/// Create a test song with minimal required fields
///
/// # Examples
///
/// ```
/// # use rmpdc_core::test_utils::create_test_song;
/// let song = create_test_song("Artist/Album/01.flac", 1);
/// assert_eq!(song.track, Some(1));
/// assert_eq!(song.title, Some("Track 1".to_string()));
/// ```
pub fn create_test_song(uri: &str, track: u32) -> Song {
    Song {
        uri: uri.to_string(),
        title: Some(format!("Track {}", track)),
        track: Some(track),
        duration: Some(Duration::from_secs(180)),
        ..Song::default()
    }
}

/// Create a test song with custom metadata fields
pub fn create_test_song_with_metadata(
    uri: &str,
    title: Option<&str>,
    artist: Option<&str>,
    album: Option<&str>,
) -> Song {
    Song {
        uri: uri.to_string(),
        title: title.map(String::from),
        artist: artist.map(String::from),
        album: album.map(String::from),
        ..Song::default()
    }
}
