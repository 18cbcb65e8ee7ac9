//! Gallery server - Main entry point
//!
//! Proxies the hosted artwork catalog as a small JSON API and serves the
//! browser frontend.

mod api;
mod catalog;
mod config;
mod server;
mod state;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "gallery")]
#[command(about = "Virtual art gallery server")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "gallery.toml")]
    config: PathBuf,

    /// Bind address for web server
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Fetch the catalog once, print it and exit
    #[arg(long)]
    list_once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // .env.local first so it wins; neither overrides the real environment
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => args.log_level.to_lowercase(),
        _ => "info".to_string(),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Gallery v{}", env!("CARGO_PKG_VERSION"));

    let mut config = config::load_config(&args.config)?;
    config.apply_env();

    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    info!(
        bind = %config.server.bind,
        web_dir = %config.server.web_dir,
        catalog_configured = config.catalog.is_configured(),
        "Configuration loaded"
    );

    let state = state::AppState::new(config.clone())?;

    if args.list_once {
        let artworks = state.catalog.fetch_artworks().await;
        println!("{} artworks:", artworks.len());
        for artwork in artworks {
            println!(
                "  - {} ({}) {}",
                artwork.title,
                artwork.id,
                artwork.price_label()
            );
            if let Some(artist) = artwork.artist_name() {
                println!("    Artist: {}", artist);
            }
            if artwork.is_sold {
                println!("    Sold");
            }
        }
    } else {
        server::run(state, &config.server.bind, config.server.tls.as_ref()).await?;
    }

    Ok(())
}
