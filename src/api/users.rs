//! User CRUD Endpoints
//! Mission: Role-gated user administration over the user store

use crate::api::response::{success, success_no_data, ApiError};
use crate::api::AppState;
use crate::auth::middleware::CurrentUser;
use crate::auth::password::hash_password;
use crate::models::{
    CreateUserRequest, CreateUserResponse, NewUser, UpdateUserResponse, UserPatch, UserResponse,
};
use crate::validation::{validate_create_user, validate_update_user};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;
use uuid::Uuid;

/// List users - GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let users = state
        .store
        .get_users()
        .await
        .map_err(|err| ApiError::from_store(err, "Users"))?;

    let response: Vec<UserResponse> = users.iter().map(UserResponse::from_user).collect();

    Ok(success(StatusCode::OK, "Users found", response))
}

/// Get one user - GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_user_id(&id)?;

    let user = state
        .store
        .get_user(id)
        .await
        .map_err(|err| ApiError::from_store(err, "User"))?;

    Ok(success(
        StatusCode::OK,
        "User found",
        UserResponse::from_user(&user),
    ))
}

/// Create user - POST /api/users (ADMIN)
pub async fn create_user(
    State(state): State<AppState>,
    admin: CurrentUser,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let role = validate_create_user(&req)?;

    let password_hash = hash_password(&req.password).map_err(ApiError::HashingFailed)?;

    let new_user = NewUser {
        name: req.name.trim().to_string(),
        full_name: req.full_name.clone().filter(|s| !s.is_empty()),
        email: req.email.trim().to_string(),
        password_hash,
        phone_number: req.phone_number.clone().filter(|s| !s.is_empty()),
        role,
    };

    let user = state
        .store
        .create_user(&new_user)
        .await
        .map_err(|err| ApiError::from_store(err, "User"))?;

    info!(user_id = %user.id, created_by = %admin.id, "✅ User created");

    Ok(success(
        StatusCode::CREATED,
        "User created successfully",
        CreateUserResponse::from_user(&user),
    ))
}

/// Update user - PATCH /api/users/{id} (ADMIN)
pub async fn update_user(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<UserPatch>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_user_id(&id)?;
    let Json(patch) = payload?;
    validate_update_user(&patch)?;

    let user = state
        .store
        .update_user(id, &patch)
        .await
        .map_err(|err| ApiError::from_store(err, "User"))?;

    info!(user_id = %user.id, updated_by = %admin.id, "User updated");

    Ok(success(
        StatusCode::OK,
        "User updated successfully",
        UpdateUserResponse::from_user(&user),
    ))
}

/// Delete user - DELETE /api/users/{id} (ADMIN)
///
/// Logical delete: the row is stamped, not removed.
pub async fn delete_user(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_user_id(&id)?;

    state
        .store
        .soft_delete_user(id)
        .await
        .map_err(|err| ApiError::from_store(err, "User"))?;

    info!(user_id = %id, deleted_by = %admin.id, "🗑️  User deleted");

    Ok(success_no_data(StatusCode::OK, "User deleted successfully"))
}

fn parse_user_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::InvalidId)
}
