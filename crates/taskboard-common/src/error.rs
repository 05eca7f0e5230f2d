//! Centralized error types for Taskboard.
//!
//! Only recoverable conditions live here. Absence (no role, no rows, a
//! malformed search token) is never an error, and programming defects such as
//! executing a query without a source table panic instead.

/// Core error type used across all Taskboard crates.
#[derive(Debug, thiserror::Error)]
pub enum TaskboardError {
    // === Boundary errors ===
    #[error("Invalid role: {value}")]
    InvalidRole { value: String },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    // === Resource errors ===
    #[error("{resource} not found")]
    NotFound { resource: String },

    // === Permission errors ===
    #[error("Forbidden")]
    Forbidden,

    // === Infrastructure errors ===
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl TaskboardError {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a missing resource.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Error code string for programmatic handling by callers.
    pub fn error_code(&self) -> &str {
        match self {
            Self::InvalidRole { .. } => "INVALID_ROLE",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Forbidden => "FORBIDDEN",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the caller should present this as an access denial.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden)
    }
}

/// Convenience type alias for Results using TaskboardError.
pub type TaskboardResult<T> = Result<T, TaskboardError>;
