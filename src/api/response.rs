//! Response Envelope & Error Taxonomy
//! Mission: One envelope for every reply, driver errors never leak out

use crate::store::StoreError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, warn};

/// Standard response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Build a success envelope with a data payload.
pub fn success<T: Serialize>(status: StatusCode, message: &str, data: T) -> Response {
    (
        status,
        Json(ApiResponse {
            success: true,
            message: message.to_string(),
            data: Some(data),
        }),
    )
        .into_response()
}

/// Build a success envelope without data.
pub fn success_no_data(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ApiResponse::<Value> {
            success: true,
            message: message.to_string(),
            data: None,
        }),
    )
        .into_response()
}

/// One failed validation rule.
#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// API error taxonomy. Every variant renders as the standard failure
/// envelope; internal detail goes to the log, not the client.
#[derive(Debug)]
pub enum ApiError {
    JsonDecode(String),
    Validation(Vec<FieldError>),
    InvalidId,
    AuthenticationRequired,
    AuthenticationFailed,
    InvalidToken,
    InsufficientPermissions,
    NotFound(&'static str),
    DuplicateEmail,
    NoFieldsToUpdate,
    HashingFailed(anyhow::Error),
    TokenGeneration(anyhow::Error),
    Internal(anyhow::Error),
}

impl ApiError {
    /// Classify a store failure, naming the resource for 404 messages.
    pub fn from_store(err: StoreError, resource: &'static str) -> Self {
        match err {
            StoreError::DuplicateEmail => ApiError::DuplicateEmail,
            StoreError::NotFound => ApiError::NotFound(resource),
            StoreError::NoFieldsToUpdate => ApiError::NoFieldsToUpdate,
            StoreError::Database(e) => ApiError::Internal(e.into()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::JsonDecode(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            ApiError::JsonDecode(detail) => {
                warn!(detail = %detail, "JSON decode error");
                (
                    StatusCode::BAD_REQUEST,
                    "Failed to parse JSON body".to_string(),
                    Some(json!("Invalid JSON format")),
                )
            }
            ApiError::Validation(fields) => {
                warn!(failed_fields = fields.len(), "Validation failed");
                (
                    StatusCode::BAD_REQUEST,
                    "Validation failed".to_string(),
                    Some(json!(fields)),
                )
            }
            ApiError::InvalidId => (
                StatusCode::BAD_REQUEST,
                "Invalid ID format".to_string(),
                Some(json!("The provided ID is not in the correct format")),
            ),
            ApiError::AuthenticationRequired => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
                Some(json!("You must be authenticated to access this resource")),
            ),
            ApiError::AuthenticationFailed => (
                StatusCode::UNAUTHORIZED,
                "Authentication failed".to_string(),
                Some(json!("Invalid credentials provided")),
            ),
            ApiError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Invalid or expired token".to_string(),
                None,
            ),
            ApiError::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                "Insufficient permissions".to_string(),
                Some(json!("You do not have permission to access this resource")),
            ),
            ApiError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                format!("{} not found", resource),
                Some(json!(format!(
                    "The requested {} could not be found",
                    resource.to_lowercase()
                ))),
            ),
            ApiError::DuplicateEmail => (
                StatusCode::CONFLICT,
                "User already exists".to_string(),
                Some(json!("A user with this email already exists")),
            ),
            ApiError::NoFieldsToUpdate => (
                StatusCode::BAD_REQUEST,
                "No fields to update".to_string(),
                Some(json!("Provide at least one non-empty field to update")),
            ),
            ApiError::HashingFailed(err) => {
                error!(error = %err, "Failed to hash password");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to hash password".to_string(),
                    None,
                )
            }
            ApiError::TokenGeneration(err) => {
                error!(error = %err, "Failed to generate token");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to generate token".to_string(),
                    None,
                )
            }
            ApiError::Internal(err) => {
                error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let mut body = json!({
            "success": false,
            "message": message,
        });
        if let Some(errors) = errors {
            body["errors"] = errors;
        }

        (status, Json(body)).into_response()
    }
}
