#![allow(clippy::cargo_common_metadata)]

pub mod artwork;
pub mod config;
pub mod discovery;
pub mod entity;
pub mod error;
pub mod song;
pub mod state;
pub mod tag;

#[cfg(feature = "test-utils")]
pub mod test_utils;
