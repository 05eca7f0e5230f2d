//! Core domain models shared across all Taskboard crates.
//!
//! These are the "truth" types: what the database stores and the core reads.
//! Identifiers are plain integers; `0` is reserved for "none" (unassigned
//! owner, no category, default swimlane).

pub mod board;
pub mod group;
pub mod project;
pub mod task;
pub mod user;

/// Re-export all model types for convenience.
pub use board::*;
pub use group::*;
pub use project::*;
pub use task::*;
pub use user::*;
