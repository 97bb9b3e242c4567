const VERSION: &str = env!("CARGO_PKG_VERSION");

use std::path::PathBuf;

use tracing::{error, info, warn};

use blame::config::{self, ConfigState};
use blame::server::McpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 2 {
        eprintln!("Usage: {} [config_file]", args[0]);
        std::process::exit(1);
    }

    // All diagnostics go to stderr; stdout carries the protocol stream.
    let log_level = std::env::var("BLAME_LOG_LEVEL").unwrap_or_else(|_| "INFO".to_string());
    tracing_subscriber::fmt()
        .with_max_level(match log_level.as_str() {
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => tracing::Level::INFO,
        })
        .with_writer(std::io::stderr)
        .init();

    let config_path = args
        .get(1)
        .map(PathBuf::from)
        .unwrap_or_else(config::resolve_path);

    let state = config::load(&config_path);
    match &state {
        ConfigState::Loaded { owners, projects } => {
            for owner in owners {
                if owner.projects.is_empty() {
                    warn!("owner {} claims no packages and cannot match any lookup", owner.name);
                }
            }
            info!("loaded {} owners from {}", owners.len(), config_path.display());
            info!("found packages: {:?}", projects);
        }
        ConfigState::Failed(err) => {
            // Load failure degrades every lookup; the server still starts.
            error!("{}", err);
        }
    }

    let server = McpServer::new(state);
    info!("blame-srv version {} running on stdio", VERSION);
    if let Err(e) = server.run().await {
        error!("Fatal server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
