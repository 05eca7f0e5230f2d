//! Repository layer: query functions organized by domain.

pub mod access;
pub mod board;
pub mod groups;
pub mod project_group_roles;
pub mod project_user_roles;
pub mod projects;
pub mod tasks;
pub mod users;
