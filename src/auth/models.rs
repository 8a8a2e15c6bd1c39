//! Authentication Models
//! Mission: Define session claims and auth request/response shapes

use crate::models::{User, UserRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT Claims payload. Only trusted after `JwtManager::validate` has checked
/// the signature, algorithm, issuer, audience and temporal window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject (user id)
    pub role: UserRole,
    pub iss: String,
    pub aud: Vec<String>,
    pub iat: usize,
    pub nbf: usize,
    pub exp: usize, // expiration timestamp
}

/// Register request body
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Register response (password never echoed)
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: String,
}

impl RegisterResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: user.created_at.clone(),
        }
    }
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response body. The token itself travels only in the cookie.
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub role: UserRole,
}
