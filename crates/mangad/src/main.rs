//! Mangad - server-rendered MangaDex frontend

mod error;
mod handler;
mod state;
mod templates;

use anyhow::{Context, Result};
use clap::Parser;
use mangadex::{ClientConfig, MangaDexClient, DEFAULT_API_BASE, DEFAULT_COVER_BASE};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

use crate::state::AppState;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Bind host
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Bind port
    #[arg(short, long, env = "PORT", default_value_t = 3001)]
    port: u16,

    /// MangaDex API base URL
    #[arg(long, env = "MANGADEX_API", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// MangaDex cover image base URL
    #[arg(long, env = "MANGADEX_COVERS", default_value = DEFAULT_COVER_BASE)]
    cover_base: String,

    /// Upstream request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Directory served under /static
    #[arg(long, default_value = "./public")]
    static_dir: PathBuf,

    /// Health check mode (for Docker)
    #[arg(long)]
    health: bool,
}

impl Args {
    fn bind(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Address the health check connects to; wildcard binds are probed on loopback
    fn probe_addr(&self) -> String {
        match self.host.as_str() {
            "0.0.0.0" => format!("127.0.0.1:{}", self.port),
            "::" | "[::]" => format!("[::1]:{}", self.port),
            _ => self.bind(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    // Health check
    if args.health {
        match TcpStream::connect(args.probe_addr()).await {
            Ok(_) => {
                println!("OK");
                std::process::exit(0);
            }
            Err(_) => {
                eprintln!("FAILED");
                std::process::exit(1);
            }
        }
    }

    info!("Starting Mangad v{}", env!("CARGO_PKG_VERSION"));
    info!("Upstream API: {}", args.api_base);
    info!("Cover host: {}", args.cover_base);
    info!("Static directory: {}", args.static_dir.display());

    if !args.static_dir.is_dir() {
        warn!(
            "Static directory {} does not exist, /static will return 404",
            args.static_dir.display()
        );
    }

    let client = MangaDexClient::new(ClientConfig {
        api_base: args.api_base.clone(),
        cover_base: args.cover_base.clone(),
        timeout: Duration::from_secs(args.timeout_secs),
    })
    .context("Failed to build MangaDex client")?;

    let state = Arc::new(AppState::new(client));
    let app = handler::router(Arc::clone(&state), &args.static_dir);

    let bind = args.bind();
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind to {}", bind))?;
    info!("Server listening on http://{}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    state.log_cache_stats();

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            warn!("Failed to listen for Ctrl+C: {}", e);
            // keep serving; the process can still be killed
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> Args {
        Args::parse_from(std::iter::once("mangad").chain(argv.iter().copied()))
    }

    #[test]
    fn test_health_probe_address() {
        assert_eq!(args(&["--host", "0.0.0.0", "--port", "8080"]).probe_addr(), "127.0.0.1:8080");
        assert_eq!(args(&["--host", "10.1.2.3", "--port", "8080"]).probe_addr(), "10.1.2.3:8080");
        assert_eq!(args(&["--host", "::", "--port", "80"]).probe_addr(), "[::1]:80");
    }
}
