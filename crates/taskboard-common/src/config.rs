//! Application configuration loaded from environment variables and config files.
//!
//! Supports `.env` files for development and environment variables for production.
//! Config precedence: env vars > .env file > config.toml > defaults

use serde::Deserialize;
use std::sync::OnceLock;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Get the global application configuration.
///
/// # Panics
/// Panics if config has not been initialized via [`init`].
pub fn get() -> &'static AppConfig {
    CONFIG.get().expect("Config not initialized. Call taskboard_common::config::init() first.")
}

/// Initialize the global configuration from environment.
///
/// Should be called once at application startup, before any other code accesses config.
pub fn init() -> Result<&'static AppConfig, config::ConfigError> {
    // Load .env file if present (development)
    let _ = dotenvy::dotenv();

    let app_config = load()?;
    Ok(CONFIG.get_or_init(|| app_config))
}

/// Build a configuration without touching the global slot.
pub fn load() -> Result<AppConfig, config::ConfigError> {
    let cfg = config::Config::builder()
        // Defaults
        .set_default("database.url", "sqlite://taskboard.db?mode=rwc")?
        .set_default("database.max_connections", 10)?
        .set_default("database.min_connections", 1)?
        .set_default("board.default_grouping", "column")?
        .set_default("search.max_results", 100)?
        .set_default("search.default_query", "status:open")?
        // Optional config file
        .add_source(config::File::with_name("config").required(false))
        // Environment variables (TASKBOARD__DATABASE__URL, TASKBOARD__SEARCH__MAX_RESULTS, etc.)
        .add_source(
            config::Environment::with_prefix("TASKBOARD")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    cfg.try_deserialize()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub board: BoardConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Connection URL understood by `sqlx::AnyPool` (sqlite or postgres)
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BoardConfig {
    /// Primary grouping for list views: `column`, `swimlane`, `assignee`,
    /// `category`, `project` or `color`.
    pub default_grouping: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Upper bound on rows returned by a search listing
    pub max_results: u32,
    /// Search expression applied when the user has not typed one
    pub default_query: String,
}
