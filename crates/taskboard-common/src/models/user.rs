//! User model: the identity layer.
//!
//! A user has one application role and may be disabled or temporarily
//! locked. Disabled and locked users keep their project roles but are never
//! offered as assignees.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::roles::ApplicationRole;

/// A Taskboard user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique login name
    pub username: String,

    /// Full name, may be empty
    #[serde(default)]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Application-wide role
    pub role: ApplicationRole,

    /// Enabled flag; disabled accounts cannot sign in or be assigned
    pub is_active: bool,

    /// Lock expiration after too many failed logins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_until: Option<DateTime<Utc>>,
}

impl User {
    /// Create an active, unlocked user with the `app-user` role.
    pub fn new(id: i64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            name: String::new(),
            email: None,
            role: ApplicationRole::User,
            is_active: true,
            locked_until: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_role(mut self, role: ApplicationRole) -> Self {
        self.role = role;
        self
    }

    /// Name shown in lists: the full name when set, otherwise the username.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.username
        } else {
            &self.name
        }
    }

    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }

    /// Active and not locked at `now`.
    pub fn is_enabled_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_locked_at(now)
    }

    pub fn is_enabled(&self) -> bool {
        self.is_enabled_at(Utc::now())
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_display_name_falls_back_to_username() {
        let user = User::new(1, "admin");
        assert_eq!(user.display_name(), "admin");
        let user = user.with_name("Ada Lovelace");
        assert_eq!(user.display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_lock_expiry() {
        let now = Utc::now();
        let mut user = User::new(2, "bob");
        user.locked_until = Some(now + Duration::minutes(5));
        assert!(!user.is_enabled_at(now));
        assert!(user.is_enabled_at(now + Duration::minutes(6)));

        user.locked_until = None;
        user.is_active = false;
        assert!(!user.is_enabled_at(now));
    }
}
