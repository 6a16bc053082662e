//! MedChat API server binary.
//!
//! Serves the REST API over PostgreSQL, or over process-local stores with
//! `--in-memory`. A background task purges expired refresh tokens.

use std::time::Duration;

use clap::Parser;
use medchat_api::AppState;
use medchat_api::config::{ApiConfig, resolve_secret};
use medchat_core::store::sweeper::spawn_session_sweeper;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "medchat_server", about = "MedChat API server")]
struct Args {
    /// Port to listen on (0 = ephemeral).
    #[arg(long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// Interface to bind.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/medchat"
    )]
    database_url: String,

    /// Secret for signing access tokens. Generated per process when unset.
    #[arg(long, env = "ACCESS_TOKEN_SECRET", hide_env_values = true)]
    access_token_secret: Option<String>,

    /// Secret for signing refresh tokens. Generated per process when unset.
    #[arg(long, env = "REFRESH_TOKEN_SECRET", hide_env_values = true)]
    refresh_token_secret: Option<String>,

    /// Maximum number of database connections in the pool.
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 5)]
    max_connections: u32,

    /// Seconds between sweeps of expired refresh tokens.
    #[arg(long, env = "SESSION_SWEEP_INTERVAL_SECS", default_value_t = 3600)]
    sweep_interval_secs: u64,

    /// Keep all data in process memory instead of PostgreSQL.
    #[arg(long, default_value_t = false)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,medchat_api=debug,medchat_core=debug")
            }),
        )
        .init();

    let args = Args::parse();

    let config = ApiConfig {
        bind_addr: format!("{}:{}", args.host, args.port),
        database_url: args.database_url,
        access_token_secret: resolve_secret("ACCESS_TOKEN_SECRET", args.access_token_secret),
        refresh_token_secret: resolve_secret("REFRESH_TOKEN_SECRET", args.refresh_token_secret),
    };
    config.validate()?;

    info!(bind_addr = %config.bind_addr, in_memory = args.in_memory, "starting medchat_server");

    let state = if args.in_memory {
        warn!("in-memory mode: accounts and conversations are lost on exit");
        AppState::in_memory(config.clone())
    } else {
        info!(max_connections = args.max_connections, "configuring connection pool");
        let pool = PgPoolOptions::new()
            .max_connections(args.max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.database_url)
            .await?;

        info!("running database migrations");
        medchat_api::migrate(&pool).await?;

        AppState::postgres(pool, config.clone())
    };

    let sweeper = spawn_session_sweeper(
        state.sessions.clone(),
        Duration::from_secs(args.sweep_interval_secs.max(1)),
    );

    let app = medchat_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
        })
        .await?;

    sweeper.abort();
    Ok(())
}
