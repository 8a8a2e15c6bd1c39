//! Domain Models
//! Mission: Define user records and role types shared across the API

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User roles for RBAC. Flat set, no hierarchy: an endpoint admits exactly
/// the roles it lists, ADMIN is not an implicit superset of OWNER.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserRole {
    #[serde(rename = "USER")]
    User,
    #[serde(rename = "OWNER")]
    Owner,
    #[serde(rename = "ADMIN")]
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "USER",
            UserRole::Owner => "OWNER",
            UserRole::Admin => "ADMIN",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "USER" => Some(UserRole::User),
            "OWNER" => Some(UserRole::Owner),
            "ADMIN" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

/// User account row. Timestamps are RFC 3339 strings as stored.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub full_name: Option<String>,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub phone_number: Option<String>,
    pub role: UserRole,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

/// Fields required to insert a user. The password is already hashed by the
/// time this struct exists.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub full_name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub phone_number: Option<String>,
    pub role: UserRole,
}

/// Partial update. `None` and empty strings both mean "leave unchanged".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

impl UserPatch {
    /// True when no field would survive the non-empty filter.
    pub fn is_empty(&self) -> bool {
        fn eligible(f: &Option<String>) -> bool {
            f.as_deref().is_some_and(|s| !s.is_empty())
        }
        !eligible(&self.name)
            && !eligible(&self.full_name)
            && !eligible(&self.email)
            && !eligible(&self.phone_number)
    }
}

/// User response (sanitized)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub role: UserRole,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            role: user.role,
        }
    }
}

/// Admin create request. ADMIN itself is deliberately absent from the
/// accepted roles, admin accounts are seeded, never minted over the API.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub role: UserRole,
    pub created_at: String,
}

impl CreateUserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            role: user.role,
            created_at: user.created_at.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateUserResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub role: UserRole,
    pub updated_at: String,
}

impl UpdateUserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            role: user.role,
            updated_at: user.updated_at.clone(),
        }
    }
}
