//! # taskboard-db
//!
//! Access control and task search for Taskboard:
//! - **permission**: effective project roles and access checks
//! - **query** / **filter** / **lexer**: search expressions compiled into
//!   task queries
//! - **formatter**: board, grouped and autocomplete views of task rows
//! - **repository**: sqlx persistence over `AnyPool` (SQLite in development)

pub mod any_compat;
pub mod filter;
pub mod formatter;
pub mod lexer;
pub mod permission;
pub mod query;
pub mod repository;
pub mod snapshot;
pub mod store;
pub mod task_finder;

pub use filter::{DateField, Filter};
pub use formatter::Formatter;
pub use lexer::LexerBuilder;
pub use permission::{AccessDirectory, PermissionModel};
pub use query::{QueryBuilder, QueryExecutor, Row};
pub use snapshot::AccessSnapshot;
pub use store::MemoryStore;
pub use task_finder::TaskFinder;

use anyhow::Result;
use sqlx::AnyPool;
use taskboard_common::config::AppConfig;

/// Shared database handle.
#[derive(Clone)]
pub struct Database {
    pub pool: AnyPool,
}

impl Database {
    /// Connect to the configured database.
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        sqlx::any::install_default_drivers();

        tracing::info!("Connecting to database...");
        let pool = sqlx::any::AnyPoolOptions::new()
            .max_connections(config.database.max_connections)
            .min_connections(config.database.min_connections)
            .connect(&config.database.url)
            .await?;
        tracing::info!("Connected to database");

        Ok(Self { pool })
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Migrations complete");
        Ok(())
    }
}
