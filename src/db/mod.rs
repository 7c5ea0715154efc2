mod models;

pub use models::*;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

use crate::config::DatabaseConfig;

pub type DbPool = SqlitePool;

/// Execute a SQL migration file, properly handling comments
async fn execute_sql(pool: &SqlitePool, sql: &str) -> Result<()> {
    // Comment lines go first so a `;` inside one cannot split a statement
    let cleaned: String = sql
        .lines()
        .filter(|line| !line.trim().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");

    for statement in cleaned.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}

/// Build the shared pool. Connections are opened on first use, so a store
/// that is not reachable yet does not prevent the server from starting;
/// problems here are logged and surface later as failed requests.
pub fn connect(config: &DatabaseConfig) -> DbPool {
    let options = match SqliteConnectOptions::from_str(&config.url) {
        Ok(options) => options,
        Err(e) => {
            warn!(url = %config.url, error = %e, "Invalid database url, treating it as a file path");
            SqliteConnectOptions::new().filename(&config.url)
        }
    }
    .create_if_missing(true)
    .foreign_keys(true)
    .journal_mode(SqliteJournalMode::Wal)
    .synchronous(SqliteSynchronous::Normal);

    if let Err(e) = ensure_parent_dir(options.get_filename()) {
        warn!(error = %e, "Database initialization warning");
    }

    info!("Using database at {}", options.get_filename().display());

    SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_lazy_with(options)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }
    }
    Ok(())
}

/// Create the tables if they are missing. Existing tables are left as they are.
pub async fn bootstrap(pool: &DbPool) -> Result<()> {
    info!("Ensuring database schema...");
    execute_sql(pool, include_str!("../../migrations/001_initial.sql")).await?;
    info!("Database initialized successfully");
    Ok(())
}

/// Run [`bootstrap`] and downgrade any failure to a warning.
pub async fn bootstrap_or_warn(pool: &DbPool) {
    if let Err(e) = bootstrap(pool).await {
        warn!(error = %e, "Database initialization warning");
    }
}

/// Single-connection in-memory store with the schema applied.
#[cfg(test)]
pub async fn memory() -> DbPool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    bootstrap(&pool).await.unwrap();
    pool
}
