use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::ApiError;
use crate::listing::Collection;

pub const ROLE_USER: &str = "user";
pub const ROLE_PUBLISHER: &str = "publisher";
pub const ROLE_ADMIN: &str = "admin";

/// Roles a caller may pick for themselves at registration.
const SELF_ASSIGNABLE_ROLES: &[&str] = &[ROLE_USER, ROLE_PUBLISHER];

/// Columns the API exposes; credential columns stay out of every listing
/// and projection.
pub static USERS: Collection = Collection {
    table: "users",
    columns: &["id", "name", "email", "role", "created_at"],
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub reset_password_token: Option<String>,
    #[serde(skip_serializing)]
    pub reset_password_expire: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

impl RegisterUser {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut field_errors = HashMap::new();
        if self.name.trim().is_empty() {
            field_errors.insert("name".to_string(), "Please add a name".to_string());
        }
        if !is_plausible_email(&self.email) {
            field_errors.insert("email".to_string(), "Please add a valid email".to_string());
        }
        if self.password.len() < 6 {
            field_errors.insert(
                "password".to_string(),
                "Password must be at least 6 characters".to_string(),
            );
        }
        if let Some(role) = &self.role {
            if !SELF_ASSIGNABLE_ROLES.contains(&role.as_str()) {
                field_errors.insert("role".to_string(), format!("Invalid role: {}", role));
            }
        }
        if field_errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Invalid user data", Some(field_errors)))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserDetails {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UpdateUserDetails {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut field_errors = HashMap::new();
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                field_errors.insert("name".to_string(), "Please add a name".to_string());
            }
        }
        if let Some(email) = &self.email {
            if !is_plausible_email(email) {
                field_errors.insert("email".to_string(), "Please add a valid email".to_string());
            }
        }
        if field_errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Invalid user data", Some(field_errors)))
        }
    }
}

/// Admin-side create/update payload; unlike registration, any role goes.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminUpsertUser {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
    pub role: Option<String>,
}

impl AdminUpsertUser {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut field_errors = HashMap::new();
        if self.name.trim().is_empty() {
            field_errors.insert("name".to_string(), "Please add a name".to_string());
        }
        if !is_plausible_email(&self.email) {
            field_errors.insert("email".to_string(), "Please add a valid email".to_string());
        }
        if let Some(password) = &self.password {
            if password.len() < 6 {
                field_errors.insert(
                    "password".to_string(),
                    "Password must be at least 6 characters".to_string(),
                );
            }
        }
        if let Some(role) = &self.role {
            if ![ROLE_USER, ROLE_PUBLISHER, ROLE_ADMIN].contains(&role.as_str()) {
                field_errors.insert("role".to_string(), format!("Invalid role: {}", role));
            }
        }
        if field_errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Invalid user data", Some(field_errors)))
        }
    }
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}
