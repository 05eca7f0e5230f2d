//! Input validation utilities.
//!
//! Role constants enter the system here. Everything past this boundary works
//! with typed [`ProjectRole`] values, which is why the core may treat an
//! unknown role as a defect.

use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::error::TaskboardError;
use crate::roles::ProjectRole;

/// Validate a request body, returning a TaskboardError::Validation on failure.
pub fn validate_request<T: Validate>(body: &T) -> Result<(), TaskboardError> {
    body.validate().map_err(|e| TaskboardError::Validation {
        message: format_validation_errors(e),
    })
}

/// Format validation errors into a human-readable string.
fn format_validation_errors(errors: validator::ValidationErrors) -> String {
    let mut messages = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for '{field}'"))
            })
        })
        .collect::<Vec<_>>();
    messages.sort();
    messages.join("; ")
}

fn validate_project_role(role: &str) -> Result<(), ValidationError> {
    role.parse::<ProjectRole>().map(|_| ()).map_err(|_| {
        let mut err = ValidationError::new("project_role");
        err.message = Some("Unknown project role".into());
        err
    })
}

/// Request to grant a project role to a user.
#[derive(Debug, Deserialize, Validate)]
pub struct UserRoleRequest {
    #[validate(range(min = 1, message = "Invalid project"))]
    pub project_id: i64,

    #[validate(range(min = 1, message = "Invalid user"))]
    pub user_id: i64,

    #[validate(custom(function = "validate_project_role"))]
    pub role: String,
}

/// Request to grant a project role to a group.
#[derive(Debug, Deserialize, Validate)]
pub struct GroupRoleRequest {
    #[validate(range(min = 1, message = "Invalid project"))]
    pub project_id: i64,

    #[validate(range(min = 1, message = "Invalid group"))]
    pub group_id: i64,

    #[validate(custom(function = "validate_project_role"))]
    pub role: String,
}

impl UserRoleRequest {
    /// Validate and convert into typed parts.
    pub fn parse(&self) -> Result<(i64, i64, ProjectRole), TaskboardError> {
        validate_request(self)?;
        Ok((self.project_id, self.user_id, self.role.parse()?))
    }
}

impl GroupRoleRequest {
    /// Validate and convert into typed parts.
    pub fn parse(&self) -> Result<(i64, i64, ProjectRole), TaskboardError> {
        validate_request(self)?;
        Ok((self.project_id, self.group_id, self.role.parse()?))
    }
}

/// Validate that a string is a usable project or group name.
pub fn validate_name(name: &str) -> Result<(), TaskboardError> {
    if name.trim().is_empty() {
        return Err(TaskboardError::Validation {
            message: "Name cannot be empty or whitespace only".into(),
        });
    }

    if name.chars().count() > 255 {
        return Err(TaskboardError::Validation {
            message: "Name must be at most 255 characters".into(),
        });
    }

    if name.chars().any(char::is_control) {
        return Err(TaskboardError::Validation {
            message: "Name cannot contain control characters".into(),
        });
    }

    Ok(())
}
