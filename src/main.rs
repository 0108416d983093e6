use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use club_video_library::config::Config;
use club_video_library::db::Database;
use club_video_library::sync::{SyncCoordinator, SystemClock};
use club_video_library::web;
use club_video_library::youtube::PlaylistFetcher;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    info!("Starting club-video-library");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    if config.youtube.live_credentials().is_some() {
        info!(api_base_url = %config.youtube.api_base_url, "YouTube sync enabled");
    } else {
        warn!("YouTube API key or playlist id missing or placeholder - serving stored videos only");
    }
    if config.admin_token.is_none() {
        warn!("ADMIN_TOKEN not set - admin routes are disabled");
    }

    if let Some(parent) = config.database_path.parent() {
        tokio::fs::create_dir_all(parent).await.with_context(|| {
            format!("Failed to create database directory: {}", parent.display())
        })?;
    }

    let db = Database::new(&config.database_path)
        .await
        .context("Failed to initialize database")?;

    info!("Database initialized");

    let fetcher = PlaylistFetcher::new(config.youtube.clone())?;
    let sync = SyncCoordinator::new(
        Arc::new(db),
        Arc::new(fetcher),
        Arc::new(SystemClock),
        config.sync_cooldown,
    );

    let config = Arc::new(config);
    let web_handle = tokio::spawn(async move {
        if let Err(e) = web::serve(config, sync).await {
            error!("Web server error: {e:#}");
        }
    });

    shutdown_signal().await;

    info!("Shutting down...");
    web_handle.abort();
    info!("Shutdown complete");

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,club_video_library=debug"));

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
