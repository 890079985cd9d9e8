// ============================
// crates/backend-bin/src/main.rs
// ============================
//! Tokio / Axum entry-point for the `sessiongate` API server.
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{extract::Request, ServiceExt};
use clap::Parser;
use sessiongate_lib::{auth::SessionManager, config::Settings, router, AppState};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "sessiongate", version, about = "Session and Basic auth API server")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the bind address from the configuration
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json: bool,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn spawn_purge_task(sessions: Arc<SessionManager>, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // the first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            let purged = sessions.purge_expired();
            if purged > 0 {
                tracing::info!(purged, "expired sessions purged");
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load_from(&args.config)
        .with_context(|| format!("loading configuration from {}", args.config.display()))?;
    if let Some(bind) = args.bind {
        settings.bind_addr = bind;
    }

    init_tracing(&settings.log_level, args.json);

    let state = Arc::new(AppState::from_settings(settings.clone())?);

    if let (Some(sessions), true) = (&state.sessions, settings.purge_interval_secs > 0) {
        spawn_purge_task(
            Arc::clone(sessions),
            Duration::from_secs(settings.purge_interval_secs),
        );
    }

    let app = router::create_router(state);

    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!(
        addr = %settings.bind_addr,
        auth_type = %settings.auth_type,
        "listening"
    );

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;

    Ok(())
}
