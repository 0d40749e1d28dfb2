use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RmpdcError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timed out waiting for the server")]
    Timeout,

    #[error("Connection closed by the server")]
    Closed,

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Cover error: {0}")]
    Cover(String),

    #[error("Discovery error: {0}")]
    Discovery(String),
}

impl RmpdcError {
    /// Whether the error leaves the connection unusable.
    ///
    /// Transport failures and malformed frames desynchronize the stream;
    /// an `ACK` from the server does not.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RmpdcError::Io(_) | RmpdcError::Timeout | RmpdcError::Closed | RmpdcError::Protocol(_)
        )
    }

    /// The ACK code when this error came from the server.
    pub fn ack_code(&self) -> Option<AckCode> {
        match self {
            RmpdcError::Server(e) => Some(e.code),
            _ => None,
        }
    }

    /// Negative sentinel of the C-style `long long` return convention.
    pub fn legacy_code(&self) -> i64 {
        -1
    }
}

/// Error codes carried by `ACK [code@index]` lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AckCode {
    NotList,
    Arg,
    Password,
    Permission,
    Unknown,
    NoExist,
    PlaylistMax,
    System,
    PlaylistLoad,
    UpdateAlready,
    PlayerSync,
    Exist,
    Other(u32),
}

impl AckCode {
    pub fn as_u32(self) -> u32 {
        match self {
            AckCode::NotList => 1,
            AckCode::Arg => 2,
            AckCode::Password => 3,
            AckCode::Permission => 4,
            AckCode::Unknown => 5,
            AckCode::NoExist => 50,
            AckCode::PlaylistMax => 51,
            AckCode::System => 52,
            AckCode::PlaylistLoad => 53,
            AckCode::UpdateAlready => 54,
            AckCode::PlayerSync => 55,
            AckCode::Exist => 56,
            AckCode::Other(code) => code,
        }
    }
}

impl From<u32> for AckCode {
    fn from(code: u32) -> Self {
        match code {
            1 => AckCode::NotList,
            2 => AckCode::Arg,
            3 => AckCode::Password,
            4 => AckCode::Permission,
            5 => AckCode::Unknown,
            50 => AckCode::NoExist,
            51 => AckCode::PlaylistMax,
            52 => AckCode::System,
            53 => AckCode::PlaylistLoad,
            54 => AckCode::UpdateAlready,
            55 => AckCode::PlayerSync,
            56 => AckCode::Exist,
            other => AckCode::Other(other),
        }
    }
}

/// A parsed `ACK [code@index] {command} message` reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerError {
    pub code: AckCode,
    /// Position of the failing command inside a command list, 0 otherwise
    pub command_list_index: u32,
    pub command: String,
    pub message: String,
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.command.is_empty() {
            write!(f, "[{}] {}", self.code.as_u32(), self.message)
        } else {
            write!(f, "[{}] {{{}}} {}", self.code.as_u32(), self.command, self.message)
        }
    }
}

impl std::error::Error for ServerError {}

pub type Result<T> = std::result::Result<T, RmpdcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_code_round_trip_known_codes() {
        for code in [1, 2, 3, 4, 5, 50, 51, 52, 53, 54, 55, 56] {
            assert_eq!(AckCode::from(code).as_u32(), code);
        }
        assert_eq!(AckCode::from(99), AckCode::Other(99));
    }

    #[test]
    fn test_fatal_classification() {
        assert!(RmpdcError::Timeout.is_fatal());
        assert!(RmpdcError::Closed.is_fatal());
        assert!(RmpdcError::Protocol("bad frame".into()).is_fatal());

        let ack = RmpdcError::Server(ServerError {
            code: AckCode::NoExist,
            command_list_index: 0,
            command: "albumart".into(),
            message: "No file exists".into(),
        });
        assert!(!ack.is_fatal());
        assert_eq!(ack.ack_code(), Some(AckCode::NoExist));
        assert_eq!(ack.legacy_code(), -1);
    }

    #[test]
    fn test_server_error_display() {
        let err = ServerError {
            code: AckCode::Unknown,
            command_list_index: 0,
            command: "frobnicate".into(),
            message: "unknown command \"frobnicate\"".into(),
        };
        assert_eq!(err.to_string(), "[5] {frobnicate} unknown command \"frobnicate\"");
    }
}
