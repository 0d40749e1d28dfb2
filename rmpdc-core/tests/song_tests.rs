use rmpdc_core::entity::{sort_by_name, Album};
use rmpdc_core::test_utils::{create_test_song, create_test_song_with_metadata};

#[test]
fn test_display_fallbacks() {
    let song = create_test_song_with_metadata("Various/Mix/07 Outro.ogg", None, None, None);
    assert_eq!(song.display_title(), "07 Outro");
    assert_eq!(song.display_artist(), "Unknown Artist");
    assert_eq!(song.display_album(), "Unknown Album");
}

#[test]
fn test_album_artist_used_when_artist_missing() {
    let mut song = create_test_song("Band/Live/01.flac", 1);
    song.album_artist = Some("Band".to_string());
    assert_eq!(song.display_artist(), "Band");
    assert_eq!(song.directory(), "Band/Live");
}

#[test]
fn test_albums_from_songs_sorted() {
    let songs = [
        create_test_song_with_metadata("z/1.mp3", None, Some("Z"), Some("Zooropa")),
        create_test_song_with_metadata("a/1.mp3", None, Some("A"), Some("'Allo")),
        create_test_song_with_metadata("b/1.mp3", None, Some("B"), Some("Blue")),
    ];

    let mut albums: Vec<Album> = songs
        .iter()
        .map(|s| Album::new(s.display_album()).with_artist(s.display_artist()))
        .collect();
    sort_by_name(&mut albums);

    let names: Vec<_> = albums.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["'Allo", "Blue", "Zooropa"]);
}
