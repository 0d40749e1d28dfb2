//! Protocol commands grouped by category
//!
//! Each function takes the connection it runs on, sends one request (or one
//! command list) and decodes the reply into core types.

pub mod albumart;
pub mod connection;
pub mod database;
pub mod outputs;
pub mod playback;
pub mod playlists;
pub mod queue;
pub mod status;

pub use albumart::{cover_for_directory, cover_for_song, run_albumart, run_albumart_with_type, run_readpicture};
