pub mod client;
pub mod command;
pub mod commands;
pub mod connection;
pub mod discovery;
pub mod filter;
pub mod parser;
pub mod response;

pub use client::Client;
pub use command::{Command, CommandList};
pub use commands::{run_albumart, run_readpicture};
pub use connection::{Connection, ConnectionState, DEFAULT_TIMEOUT};
pub use discovery::DiscoveryService;
pub use filter::Filter;
pub use parser::ProtocolVersion;
