// Authentication data models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Named permission group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Role {
    Admin,
    #[serde(rename = "HR")]
    Hr,
    Interviewer,
}

impl Role {
    /// Roles an administrator may hand out through user creation
    pub const ASSIGNABLE: [Role; 2] = [Role::Hr, Role::Interviewer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Hr => "HR",
            Role::Interviewer => "Interviewer",
        }
    }

    /// Parse a role an administrator is allowed to assign. Matching is exact.
    pub fn parse_assignable(name: &str) -> Option<Role> {
        Role::ASSIGNABLE
            .into_iter()
            .find(|role| role.as_str() == name)
    }

    /// Lower ranks win when picking a user's primary role
    fn rank(name: &str) -> usize {
        match name.parse::<Role>() {
            Ok(Role::Admin) => 0,
            Ok(Role::Hr) => 1,
            Ok(Role::Interviewer) => 2,
            Err(_) => 3,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Role::Admin),
            "HR" => Ok(Role::Hr),
            "Interviewer" => Ok(Role::Interviewer),
            other => Err(other.to_string()),
        }
    }
}

/// Pick the single role surfaced in flattened responses.
///
/// Known roles follow `Admin > HR > Interviewer`; unknown names sort after
/// them lexically. A user with no roles gets an empty string.
pub fn primary_role(roles: &[String]) -> String {
    roles
        .iter()
        .min_by(|a, b| Role::rank(a).cmp(&Role::rank(b)).then_with(|| a.cmp(b)))
        .cloned()
        .unwrap_or_default()
}

/// Display name built from the optional name parts.
///
/// Parts are trimmed and blank parts dropped, so a missing last name never
/// leaves a trailing space.
pub fn full_name(first_name: Option<&str>, last_name: Option<&str>) -> String {
    [first_name, last_name]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// User record as held by the credential store
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub normalized_email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub created_date: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        full_name(self.first_name.as_deref(), self.last_name.as_deref())
    }
}

/// Fields needed to persist a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Lower-cased, trimmed email used for lookups and uniqueness
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Login request DTO
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "hr@example.com")]
    pub email: String,
    #[schema(example = "P@ssw0rd!")]
    pub password: String,
}

/// Admin request to create an HR or Interviewer account
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[schema(example = "interviewer@example.com")]
    pub email: String,
    #[schema(example = "P@ssw0rd!")]
    pub password: String,
    #[serde(default)]
    #[schema(example = "Ada")]
    pub first_name: Option<String>,
    #[serde(default)]
    #[schema(example = "Lovelace")]
    pub last_name: Option<String>,
    #[schema(example = "Interviewer")]
    pub role: String,
}

/// Result of a successful login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user_id: String,
    pub email: String,
    pub full_name: String,
    /// Primary role, or empty when the user holds none
    pub role: String,
    pub expiration: DateTime<Utc>,
}

/// Public projection of a user (excludes password_hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub is_active: bool,
    pub created_date: DateTime<Utc>,
}

impl UserResponse {
    pub fn from_user(user: &User, role: String) -> Self {
        Self {
            user_id: user.id.to_string(),
            email: user.email.clone(),
            full_name: user.full_name(),
            role,
            is_active: user.is_active,
            created_date: user.created_date,
        }
    }
}

/// Identity of the caller, read straight from token claims
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user_id: String,
    pub email: String,
    pub role: String,
    pub name: String,
}
