//! Client command groups against a scripted daemon

mod common;

use common::{ack, Action, MockServer, Reply};
use rmpdc_core::config::Config;
use rmpdc_core::entity::{Album, Entity, EntityKind};
use rmpdc_core::error::{AckCode, RmpdcError};
use rmpdc_core::song::Song;
use rmpdc_core::state::PlayerState;
use rmpdc_core::test_utils::create_test_song;
use rmpdc_core::tag::TagType;
use rmpdc_protocol::commands::{connection, database, outputs, playback, playlists, queue, status};
use rmpdc_protocol::{Client, Command, CommandList, Filter};

#[tokio::test]
async fn test_client_sends_password_first() {
    let server = MockServer::start(|request: &str| -> Action {
        match request {
            "password hunter2" | "ping" => "OK\n".into(),
            other => ack(5, 0, "", &format!("unexpected {other}")).into(),
        }
    })
    .await;

    let mut config = server.server_config();
    config.password = Some("hunter2".to_string());
    let mut client = Client::connect(&config, common::CLIENT_TIMEOUT).await.unwrap();
    connection::ping(&mut client).await.unwrap();

    assert_eq!(server.received(), vec!["password hunter2", "ping"]);
    assert_eq!(client.server().name, "mock");
}

#[tokio::test]
async fn test_wrong_password_fails_connect() {
    let server = MockServer::start(|_: &str| ack(3, 0, "password", "incorrect password")).await;
    let mut config = server.server_config();
    config.password = Some("nope".to_string());

    let err = Client::connect(&config, common::CLIENT_TIMEOUT).await.unwrap_err();
    assert_eq!(err.ack_code(), Some(AckCode::Password));
}

#[tokio::test]
async fn test_from_config_applies_binary_limit() {
    let server = MockServer::start(|_: &str| "OK\n").await;
    let config = Config::from_toml(&format!(
        r#"
        [network]
        binary_limit = 1048576

        [[server]]
        name = "mock"
        hostname = "127.0.0.1"
        port = {}
        "#,
        server.port()
    ))
    .unwrap();

    let selected = config.select_server(None).unwrap();
    let _client = Client::from_config(&config, &selected).await.unwrap();
    assert_eq!(server.received(), vec!["binarylimit 1048576"]);
}

#[tokio::test]
async fn test_binary_limit_skipped_on_old_servers() {
    let server = MockServer::start_with_greeting("OK MPD 0.21.11\n", |_: &str| "OK\n").await;
    let mut conn = server.connect().await;

    assert!(!connection::binary_limit(&mut conn, 65536).await.unwrap());
    assert!(server.received().is_empty());
}

#[tokio::test]
async fn test_status_and_current_song() {
    let server = MockServer::start(|request: &str| -> Action {
        match request {
            "status" => Reply::new()
                .field("volume", 42)
                .field("state", "pause")
                .field("song", 0)
                .field("songid", 7)
                .field("elapsed", "12.5")
                .field("duration", "200.0")
                .ok()
                .into(),
            "currentsong" => Reply::new()
                .field("file", "Joni Mitchell/Blue/01.flac")
                .field("Title", "All I Want")
                .field("Pos", 0)
                .field("Id", 7)
                .ok()
                .into(),
            _ => "OK\n".into(),
        }
    })
    .await;
    let mut conn = server.connect().await;

    let st = status::status(&mut conn).await.unwrap();
    assert_eq!(st.state, PlayerState::Pause);
    assert_eq!(st.volume, Some(42));
    assert_eq!(st.current_song.map(|s| s.id), Some(7));

    let song = status::current_song(&mut conn).await.unwrap().unwrap();
    assert_eq!(song.display_title(), "All I Want");
    assert_eq!(song.id, Some(7));

    assert_eq!(status::volume(&mut conn).await.unwrap(), Some(42));
}

#[tokio::test]
async fn test_current_song_empty_queue() {
    let server = MockServer::start(|_: &str| "OK\n").await;
    let mut conn = server.connect().await;
    assert!(status::current_song(&mut conn).await.unwrap().is_none());
}

#[tokio::test]
async fn test_toggle_pause_resumes_paused_player() {
    let server = MockServer::start(|request: &str| -> Action {
        match request {
            "status" => Reply::new().field("state", "pause").ok().into(),
            _ => "OK\n".into(),
        }
    })
    .await;
    let mut conn = server.connect().await;

    assert_eq!(playback::toggle_pause(&mut conn).await.unwrap(), PlayerState::Play);
    assert_eq!(server.received(), vec!["status", "pause 0"]);
}

#[tokio::test]
async fn test_playback_argument_encoding() {
    let server = MockServer::start(|_: &str| "OK\n").await;
    let mut conn = server.connect().await;

    playback::set_volume(&mut conn, 55).await.unwrap();
    playback::set_random(&mut conn, true).await.unwrap();
    playback::seek(&mut conn, std::time::Duration::from_millis(61_500)).await.unwrap();
    playback::play_position(&mut conn, 3).await.unwrap();

    let err = playback::set_volume(&mut conn, 101).await.unwrap_err();
    assert!(matches!(err, RmpdcError::Argument(_)));

    assert_eq!(
        server.received(),
        vec!["setvol 55", "random 1", "seekcur 61.500", "play 3"]
    );
}

#[tokio::test]
async fn test_play_tracks_sends_one_command_list() {
    let server = MockServer::start(|_: &str| "list_OK\nlist_OK\nlist_OK\nlist_OK\nlist_OK\nlist_OK\nOK\n").await;
    let mut conn = server.connect().await;

    let tracks: Vec<Song> = vec![create_test_song("a/1.flac", 1), create_test_song("a/2 b.flac", 2)];
    queue::play_tracks(&mut conn, &tracks, false, true).await.unwrap();

    assert_eq!(
        server.received(),
        vec!["command_list_ok_begin\nclear\nadd a/1.flac\nadd \"a/2 b.flac\"\nrandom 0\nrepeat 1\nplay 0\ncommand_list_end"]
    );
}

#[tokio::test]
async fn test_play_tracks_rejects_empty_list() {
    let server = MockServer::start(|_: &str| "OK\n").await;
    let mut conn = server.connect().await;

    let err = queue::play_tracks(&mut conn, &[], true, false).await.unwrap_err();
    assert!(matches!(err, RmpdcError::Argument(_)));
    assert!(server.received().is_empty());
}

#[tokio::test]
async fn test_command_list_error_reports_index() {
    let server = MockServer::start(|_: &str| format!("list_OK\n{}", ack(50, 1, "add", "No such directory"))).await;
    let mut conn = server.connect().await;

    let list: CommandList = ["ok.flac", "gone.flac"]
        .iter()
        .map(|uri| Command::new("add").arg(uri))
        .collect();
    let err = conn.run_list(&list).await.unwrap_err();
    let RmpdcError::Server(e) = &err else {
        panic!("expected server error, got {err:?}");
    };
    assert_eq!(e.command_list_index, 1);
    assert!(conn.is_usable());
}

#[tokio::test]
async fn test_list_entities_sorted_without_empty_names() {
    let server = MockServer::start(|request: &str| -> Action {
        assert_eq!(request, "list Album");
        Reply::new()
            .field("Album", "Court and Spark")
            .field("Album", "")
            .field("Album", "\"Blue\"")
            .field("Album", "Hejira")
            .ok()
            .into()
    })
    .await;
    let mut conn = server.connect().await;

    let albums = database::list_entities(&mut conn, EntityKind::Albums).await.unwrap();
    let names: Vec<&str> = albums.iter().map(Entity::name).collect();
    assert_eq!(names, ["\"Blue\"", "Court and Spark", "Hejira"]);
    assert!(matches!(albums[0], Entity::Album(_)));
}

#[tokio::test]
async fn test_albums_for_artist_uses_filter() {
    let server = MockServer::start(|_: &str| Reply::new().field("Album", "Blue").ok()).await;
    let mut conn = server.connect().await;

    let albums = database::albums_for_artist(&mut conn, "Joni Mitchell", true).await.unwrap();
    assert_eq!(albums, vec![Album::new("Blue").with_artist("Joni Mitchell")]);
    assert_eq!(
        server.received(),
        vec!["list Album \"(AlbumArtist == \\\"Joni Mitchell\\\")\""]
    );
}

#[tokio::test]
async fn test_tracks_for_album_in_track_order() {
    let server = MockServer::start(|_: &str| {
        Reply::new()
            .field("file", "Blue/02.flac")
            .field("Track", "2/10")
            .field("file", "Blue/01.flac")
            .field("Track", "1/10")
            .ok()
    })
    .await;
    let mut conn = server.connect().await;

    let album = Album::new("Blue").with_artist("Joni Mitchell");
    let tracks = database::tracks_for_album(&mut conn, &album).await.unwrap();
    let uris: Vec<&str> = tracks.iter().map(|t| t.uri.as_str()).collect();
    assert_eq!(uris, ["Blue/01.flac", "Blue/02.flac"]);
    assert_eq!(
        server.received(),
        vec!["find \"((Album == \\\"Blue\\\") AND (AlbumArtist == \\\"Joni Mitchell\\\"))\""]
    );
}

#[tokio::test]
async fn test_path_for_album() {
    let server = MockServer::start(|_: &str| Reply::new().field("file", "Joni Mitchell/Blue/01.flac").ok()).await;
    let mut conn = server.connect().await;

    let path = database::path_for_album(&mut conn, &Album::new("Blue")).await.unwrap();
    assert_eq!(path, "Joni Mitchell/Blue");
}

#[tokio::test]
async fn test_album_metadata_truncates_year() {
    let server = MockServer::start(|request: &str| -> Action {
        if request.starts_with("list AlbumArtist") {
            Reply::new().field("AlbumArtist", "Joni Mitchell").ok().into()
        } else if request.starts_with("list Date") {
            Reply::new().field("Date", "1971-06-22").ok().into()
        } else {
            Reply::new().field("Genre", "Folk").ok().into()
        }
    })
    .await;
    let mut conn = server.connect().await;

    let album = database::album_metadata(&mut conn, &Album::new("Blue")).await.unwrap();
    assert_eq!(album.artist.as_deref(), Some("Joni Mitchell"));
    assert_eq!(album.date.as_deref(), Some("1971"));
    assert_eq!(album.genre.as_deref(), Some("Folk"));
}

#[tokio::test]
async fn test_search_requires_constraint() {
    let server = MockServer::start(|_: &str| "OK\n").await;
    let mut conn = server.connect().await;

    let err = database::search(&mut conn, &Filter::new()).await.unwrap_err();
    assert!(matches!(err, RmpdcError::Argument(_)));

    let songs = database::search(&mut conn, &Filter::new().tag_contains(TagType::Title, "want"))
        .await
        .unwrap();
    assert!(songs.is_empty());
    assert_eq!(server.received(), vec!["search \"(Title contains \\\"want\\\")\""]);
}

#[tokio::test]
async fn test_update_returns_job_id() {
    let server = MockServer::start(|_: &str| Reply::new().field("updating_db", 12).ok()).await;
    let mut conn = server.connect().await;

    assert_eq!(database::update(&mut conn, Some("Joni Mitchell")).await.unwrap(), 12);
    assert_eq!(server.received(), vec!["update \"Joni Mitchell\""]);
}

#[tokio::test]
async fn test_create_playlist_saves_then_clears() {
    let server = MockServer::start(|_: &str| "OK\n").await;
    let mut conn = server.connect().await;

    playlists::create_playlist(&mut conn, "road trip").await.unwrap();
    assert_eq!(
        server.received(),
        vec!["save \"road trip\"", "playlistclear \"road trip\""]
    );
}

#[tokio::test]
async fn test_playlists_sorted() {
    let server = MockServer::start(|_: &str| {
        Reply::new()
            .field("playlist", "zen")
            .field("Last-Modified", "2024-01-01T00:00:00Z")
            .field("playlist", "'80s")
            .ok()
    })
    .await;
    let mut conn = server.connect().await;

    let lists = playlists::playlists(&mut conn).await.unwrap();
    assert_eq!(lists[0].name, "'80s");
    assert_eq!(lists[1].last_modified.as_deref(), Some("2024-01-01T00:00:00Z"));
}

#[tokio::test]
async fn test_toggle_output() {
    let server = MockServer::start(|request: &str| -> Action {
        match request {
            "outputs" => Reply::new()
                .field("outputid", 0)
                .field("outputname", "ALSA")
                .field("outputenabled", 1)
                .ok()
                .into(),
            _ => "OK\n".into(),
        }
    })
    .await;
    let mut conn = server.connect().await;

    assert!(!outputs::toggle_output(&mut conn, 0).await.unwrap());
    assert_eq!(server.received(), vec!["outputs", "disableoutput 0"]);

    let err = outputs::toggle_output(&mut conn, 9).await.unwrap_err();
    assert!(matches!(err, RmpdcError::NotFound(_)));
}
