use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kindhearts::config::{Config, Overrides};
use kindhearts::storage::UploadStore;
use kindhearts::AppState;

#[derive(Parser, Debug)]
#[command(name = "kindhearts")]
#[command(author, version, about = "KindHearts reporting and donation backend", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "kindhearts.toml")]
    config: PathBuf,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Directory uploaded images are written to
    #[arg(long, env = "UPLOADS_DIR")]
    uploads_dir: Option<PathBuf>,

    /// Override log level
    #[arg(short, long, env = "KINDHEARTS_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config)?.apply(Overrides {
        port: cli.port,
        database_url: cli.database_url,
        uploads_dir: cli.uploads_dir,
        log_level: cli.log_level,
    });

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting KindHearts v{}", env!("CARGO_PKG_VERSION"));

    // Open the store; schema problems are reported but do not stop startup
    let db = kindhearts::db::connect(&config.database);
    kindhearts::db::bootstrap_or_warn(&db).await;

    let uploads = UploadStore::open(&config.paths.uploads_dir)?;

    let state = Arc::new(AppState::new(config.clone(), db.clone(), uploads));
    let app = kindhearts::web::create_app(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server running on http://{}", addr);
    tracing::info!("Serving frontend from {}", config.paths.frontend_dir.display());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    tracing::info!("Server stopped");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
