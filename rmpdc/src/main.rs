use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

mod app;

#[derive(Parser, Debug)]
#[command(author, version, about = "rmpdc - Rust Music Player Daemon client", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Configured server to use
    #[arg(short, long)]
    server: Option<String>,

    /// Server hostname or socket path, overrides MPD_HOST
    #[arg(long)]
    host: Option<String>,

    /// Port number, overrides MPD_PORT
    #[arg(short, long)]
    port: Option<u16>,

    /// Server password
    #[arg(long)]
    password: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: app::Action,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = if let Some(config_path) = &args.config {
        rmpdc_core::config::Config::load_from_path(config_path)?
    } else {
        rmpdc_core::config::Config::load_or_default()
    };

    // Initialize logging on stderr, stdout carries command output
    let log_level = if args.verbose { "debug" } else { config.general.log_level.as_str() };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    debug!("rmpdc v{}", env!("CARGO_PKG_VERSION"));

    // Environment first, then CLI arguments
    let mut server = config.select_server(args.server.as_deref())?;
    server.apply_overrides(
        std::env::var("MPD_HOST").ok().as_deref(),
        std::env::var("MPD_PORT").ok().as_deref(),
    );
    if let Some(host) = args.host {
        server.hostname = host;
    }
    if let Some(port) = args.port {
        server.port = port;
    }
    if let Some(password) = args.password {
        server.password = Some(password);
    }

    info!("Using server {} ({}:{})", server.name, server.hostname, server.port);

    app::run(config, server, args.command).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_global_options() {
        let args = Args::try_parse_from([
            "rmpdc", "--host", "music.local", "-p", "6601", "-v", "albumart", "a/b.flac", "-o", "cover.jpg",
        ])
        .unwrap();
        assert_eq!(args.host.as_deref(), Some("music.local"));
        assert_eq!(args.port, Some(6601));
        assert!(args.verbose);
        assert!(matches!(args.command, app::Action::Albumart { .. }));
    }
}
