use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use crate::error::RmpdcError;
use crate::song::AudioFormat;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    #[default]
    Stop,
    Play,
    Pause,
}

impl PlayerState {
    pub fn as_str(self) -> &'static str {
        match self {
            PlayerState::Stop => "stop",
            PlayerState::Play => "play",
            PlayerState::Pause => "pause",
        }
    }
}

impl FromStr for PlayerState {
    type Err = RmpdcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stop" => Ok(Self::Stop),
            "play" => Ok(Self::Play),
            "pause" => Ok(Self::Pause),
            other => Err(RmpdcError::Protocol(format!("unknown player state: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SingleMode {
    #[default]
    Off,
    On,
    Oneshot,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsumeMode {
    #[default]
    Off,
    On,
    Oneshot,
}

fn parse_tristate(s: &str) -> Result<u8, RmpdcError> {
    match s {
        "0" => Ok(0),
        "1" => Ok(1),
        "oneshot" => Ok(2),
        other => Err(RmpdcError::Protocol(format!("invalid mode value: {}", other))),
    }
}

impl FromStr for SingleMode {
    type Err = RmpdcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match parse_tristate(s)? {
            0 => Self::Off,
            1 => Self::On,
            _ => Self::Oneshot,
        })
    }
}

impl FromStr for ConsumeMode {
    type Err = RmpdcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match parse_tristate(s)? {
            0 => Self::Off,
            1 => Self::On,
            _ => Self::Oneshot,
        })
    }
}

impl SingleMode {
    pub fn as_arg(self) -> &'static str {
        match self {
            SingleMode::Off => "0",
            SingleMode::On => "1",
            SingleMode::Oneshot => "oneshot",
        }
    }
}

impl ConsumeMode {
    pub fn as_arg(self) -> &'static str {
        match self {
            ConsumeMode::Off => "0",
            ConsumeMode::On => "1",
            ConsumeMode::Oneshot => "oneshot",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuePosition {
    pub position: u32,
    pub id: u32,
}

/// Player status as reported by `status`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatus {
    pub state: PlayerState,
    /// `None` when the server has no mixer
    pub volume: Option<u8>,
    pub repeat: bool,
    pub random: bool,
    pub single: SingleMode,
    pub consume: ConsumeMode,
    pub current_song: Option<QueuePosition>,
    pub next_song: Option<QueuePosition>,
    pub elapsed: Option<Duration>,
    pub duration: Option<Duration>,
    pub bitrate: Option<u32>,
    pub audio_format: Option<AudioFormat>,
    pub crossfade: u32,
    pub playlist_version: u32,
    pub playlist_length: u32,
    pub updating_db: Option<u32>,
    pub partition: Option<String>,
    pub error: Option<String>,
}

impl PlayerStatus {
    pub fn is_playing(&self) -> bool {
        self.state == PlayerState::Play
    }
}

/// Database and daemon counters reported by `stats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub artists: u32,
    pub albums: u32,
    pub songs: u32,
    pub uptime: Duration,
    pub playtime: Duration,
    pub db_playtime: Duration,
    /// Unix timestamp of the last database update
    pub db_update: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioOutput {
    pub id: u32,
    pub name: String,
    pub plugin: Option<String>,
    pub enabled: bool,
}
