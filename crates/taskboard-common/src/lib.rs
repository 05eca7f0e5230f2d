//! # taskboard-common
//!
//! Shared types, configuration, error handling, and the role registry used
//! across all Taskboard crates. This is the foundation layer: no queries,
//! just primitives and contracts.

pub mod any_row;
pub mod config;
pub mod error;
pub mod models;
pub mod permissions;
pub mod roles;
pub mod validation;

pub use error::{TaskboardError, TaskboardResult};
pub use roles::{ApplicationRole, ProjectRole, Role};
