use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Subcommand, ValueEnum};
use rmpdc_core::config::{Config, ServerConfig};
use rmpdc_core::entity::{Album, EntityKind};
use rmpdc_core::song::Song;
use rmpdc_cover::CoverFetcher;
use rmpdc_protocol::commands::{database, outputs, playback, playlists, queue, status};
use rmpdc_protocol::discovery::DEFAULT_BROWSE_TIMEOUT;
use rmpdc_protocol::{Client, DiscoveryService, run_albumart, run_readpicture};
use tokio::io::AsyncWriteExt;
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum Action {
    /// Download the cover file stored next to a song
    Albumart {
        uri: String,
        /// Write to FILE instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Download the picture embedded in a song's tags
    Readpicture {
        uri: String,
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Find an album cover through the caches, the server and the web
    Cover {
        #[arg(long)]
        album: String,
        #[arg(long)]
        artist: Option<String>,
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    Status,
    /// Show the current song
    Current,
    Stats,
    Outputs,
    ToggleOutput {
        id: u32,
    },
    Play {
        /// Queue position
        position: Option<u32>,
    },
    /// Toggle pause
    Pause,
    Stop,
    Next,
    Prev,
    Volume {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        value: u8,
    },
    Random {
        state: Switch,
    },
    Repeat {
        state: Switch,
    },
    Queue,
    Albums {
        #[arg(long)]
        artist: Option<String>,
        /// Match --artist against the album artist tag
        #[arg(long, requires = "artist")]
        album_artist: bool,
        #[arg(long, conflicts_with = "artist")]
        genre: Option<String>,
    },
    Artists,
    Genres,
    Tracks {
        #[arg(long)]
        album: String,
        #[arg(long)]
        artist: Option<String>,
    },
    Playlists,
    /// Show the tracks of a stored playlist
    Playlist {
        name: String,
    },
    /// Start a database update
    Update {
        path: Option<String>,
    },
    /// Browse the local network for servers
    Discover,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    fn enabled(self) -> bool {
        self == Switch::On
    }
}

pub async fn run(config: Config, server: ServerConfig, action: Action) -> Result<()> {
    if let Action::Discover = action {
        return discover().await;
    }

    let mut client = Client::from_config(&config, &server)
        .await
        .with_context(|| format!("Failed to connect to {}:{}", server.hostname, server.port))?;
    info!("Connected, protocol {}", client.version());

    let result = dispatch(&config, &mut client, action).await;
    client.disconnect().await?;
    result
}

async fn dispatch(config: &Config, client: &mut Client, action: Action) -> Result<()> {
    match action {
        Action::Albumart { uri, output } => {
            let data = run_albumart(client, &uri).await?;
            write_picture(&data, output).await?;
        }
        Action::Readpicture { uri, output } => match run_readpicture(client, &uri).await? {
            Some(art) => write_picture(&art.data, output).await?,
            None => bail!("{} has no embedded picture", uri),
        },
        Action::Cover { album, artist, output } => {
            let mut album = Album::new(album);
            album.artist = artist;
            let fetcher = CoverFetcher::from_config(&config.covers).await?;
            match fetcher.cover_for_album_with_source(client, &album).await? {
                Some((art, source)) => {
                    info!("Cover for {} from {:?} ({})", album.name, source, art.mime_type);
                    write_picture(&art.data, output).await?;
                }
                None => bail!("No cover found for album {}", album.name),
            }
        }
        Action::Status => {
            let st = status::status(client).await?;
            println!("state: {}", st.state.as_str());
            match st.volume {
                Some(volume) => println!("volume: {}%", volume),
                None => println!("volume: n/a"),
            }
            println!("repeat: {}  random: {}", on_off(st.repeat), on_off(st.random));
            if let Some(current) = st.current_song {
                println!("song: {}/{}", current.position + 1, st.playlist_length);
            }
            if let (Some(elapsed), Some(duration)) = (st.elapsed, st.duration) {
                println!("time: {}/{}", format_duration(elapsed), format_duration(duration));
            }
            if let Some(format) = st.audio_format {
                println!("format: {}", format);
            }
            if let Some(job) = st.updating_db {
                println!("updating_db: {}", job);
            }
            if let Some(error) = st.error {
                println!("error: {}", error);
            }
        }
        Action::Current => match status::current_song(client).await? {
            Some(song) => println!("{}", describe(&song)),
            None => println!("Nothing playing"),
        },
        Action::Stats => {
            let stats = status::stats(client).await?;
            println!("artists: {}", stats.artists);
            println!("albums: {}", stats.albums);
            println!("songs: {}", stats.songs);
            println!("uptime: {}", format_duration(stats.uptime));
            println!("db playtime: {}", format_duration(stats.db_playtime));
        }
        Action::Outputs => {
            for output in outputs::outputs(client).await? {
                println!(
                    "{:>3}  [{}]  {}",
                    output.id,
                    if output.enabled { "x" } else { " " },
                    output.name
                );
            }
        }
        Action::ToggleOutput { id } => {
            let enabled = outputs::toggle_output(client, id).await?;
            println!("output {} {}", id, if enabled { "enabled" } else { "disabled" });
        }
        Action::Play { position } => match position {
            Some(position) => playback::play_position(client, position).await?,
            None => playback::play(client).await?,
        },
        Action::Pause => {
            let state = playback::toggle_pause(client).await?;
            println!("{}", state.as_str());
        }
        Action::Stop => playback::stop(client).await?,
        Action::Next => playback::next(client).await?,
        Action::Prev => playback::previous(client).await?,
        Action::Volume { value } => playback::set_volume(client, value).await?,
        Action::Random { state } => playback::set_random(client, state.enabled()).await?,
        Action::Repeat { state } => playback::set_repeat(client, state.enabled()).await?,
        Action::Queue => {
            for song in queue::queue(client).await? {
                let position = song.position.map(|p| p + 1).unwrap_or_default();
                println!("{:>4}  {}", position, describe(&song));
            }
        }
        Action::Albums {
            artist,
            album_artist,
            genre,
        } => {
            let names: Vec<String> = if let Some(genre) = genre {
                database::albums_for_genre(client, &genre)
                    .await?
                    .into_iter()
                    .map(|a| a.name)
                    .collect()
            } else if let Some(artist) = artist {
                database::albums_for_artist(client, &artist, album_artist)
                    .await?
                    .into_iter()
                    .map(|a| a.name)
                    .collect()
            } else {
                entity_names(client, EntityKind::Albums).await?
            };
            print_lines(&names);
        }
        Action::Artists => print_lines(&entity_names(client, EntityKind::Artists).await?),
        Action::Genres => print_lines(&entity_names(client, EntityKind::Genres).await?),
        Action::Tracks { album, artist } => {
            let mut album = Album::new(album);
            album.artist = artist;
            for song in database::tracks_for_album(client, &album).await? {
                let track = song.track.map(|t| t.to_string()).unwrap_or_default();
                println!("{:>3}  {}", track, describe(&song));
            }
        }
        Action::Playlists => {
            for playlist in playlists::playlists(client).await? {
                println!("{}", playlist.name);
            }
        }
        Action::Playlist { name } => {
            for song in playlists::playlist_tracks(client, &name).await? {
                println!("{}", describe(&song));
            }
        }
        Action::Update { path } => {
            let job = database::update(client, path.as_deref()).await?;
            println!("updating_db: {}", job);
        }
        Action::Discover => discover().await?,
    }
    Ok(())
}

async fn discover() -> Result<()> {
    let service = DiscoveryService::new(DEFAULT_BROWSE_TIMEOUT)?;
    let servers = service.scan().await?;
    if servers.is_empty() {
        println!("No servers found");
    }
    for server in servers {
        println!("{}", server);
    }
    Ok(())
}

async fn entity_names(client: &mut Client, kind: EntityKind) -> Result<Vec<String>> {
    Ok(database::list_entities(client, kind)
        .await?
        .iter()
        .map(|e| e.name().to_owned())
        .collect())
}

async fn write_picture(data: &[u8], output: Option<PathBuf>) -> Result<()> {
    if data.is_empty() {
        bail!("Server returned no picture data");
    }
    match output {
        Some(path) => {
            tokio::fs::write(&path, data)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} bytes to {}", data.len(), path.display());
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(data).await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

fn describe(song: &Song) -> String {
    format!("{} - {} ({})", song.display_artist(), song.display_title(), song.display_album())
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
    } else {
        format!("{}:{:02}", secs / 60, secs % 60)
    }
}
