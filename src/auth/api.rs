//! Authentication API Endpoints
//! Mission: Registration, login, session introspection and logout

use crate::api::response::{success, success_no_data, ApiError};
use crate::api::AppState;
use crate::auth::middleware::{CurrentUser, SESSION_COOKIE};
use crate::auth::models::{LoginRequest, RegisterRequest, RegisterResponse, RoleResponse};
use crate::auth::password::{hash_password, verify_password};
use crate::models::{NewUser, UserResponse, UserRole};
use crate::validation::{validate_login, validate_register};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::{info, warn};

/// Register endpoint - POST /api/auth/register
///
/// New accounts always get the USER role; role is never client-supplied
/// here.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    validate_register(&req)?;

    let password_hash = hash_password(&req.password).map_err(ApiError::HashingFailed)?;

    let new_user = NewUser {
        name: req.name.trim().to_string(),
        full_name: None,
        email: req.email.trim().to_string(),
        password_hash,
        phone_number: None,
        role: UserRole::User,
    };

    let user = state
        .store
        .create_user(&new_user)
        .await
        .map_err(|err| ApiError::from_store(err, "User"))?;

    info!(user_id = %user.id, "✅ User registered");

    Ok(success(
        StatusCode::CREATED,
        "User registered successfully",
        RegisterResponse::from_user(&user),
    ))
}

/// Login endpoint - POST /api/auth/login
///
/// Sets the session cookie and returns the caller's role. Unknown email
/// and wrong password produce the same response on purpose: the client
/// must not learn which one it was.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    validate_login(&req)?;

    let user = match state.store.get_user_by_email(req.email.trim()).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!("❌ Login attempt for unknown email");
            return Err(ApiError::AuthenticationFailed);
        }
        Err(err) => return Err(ApiError::from_store(err, "User")),
    };

    if !verify_password(&req.password, &user.password_hash) {
        warn!(user_id = %user.id, "❌ Failed login attempt");
        return Err(ApiError::AuthenticationFailed);
    }

    let (token, expires_in) = state
        .jwt
        .issue(user.id, user.role)
        .map_err(ApiError::TokenGeneration)?;

    let cookie = session_cookie(&token, expires_in)?;

    info!(user_id = %user.id, role = user.role.as_str(), "✅ Login successful");

    Ok((
        jar.add(cookie),
        success(
            StatusCode::OK,
            "Login successful",
            RoleResponse { role: user.role },
        ),
    ))
}

/// Current user endpoint - GET /api/auth/me
///
/// Reads the store rather than echoing claims, so a user deleted after
/// token issuance gets a 404 instead of stale data.
pub async fn me(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .store
        .get_user(user.id)
        .await
        .map_err(|err| ApiError::from_store(err, "User"))?;

    Ok(success(
        StatusCode::OK,
        "User found",
        UserResponse::from_user(&record),
    ))
}

/// Logout endpoint - POST /api/auth/logout
///
/// Clears the cookie client-side. Tokens are stateless, so a replayed
/// token stays valid until expiry; this is a UX affordance, not
/// revocation.
pub async fn logout(
    jar: CookieJar,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let cookie = clear_session_cookie()?;

    info!(user_id = %user.id, "Logout");

    Ok((
        jar.add(cookie),
        success_no_data(StatusCode::OK, "Logout successful"),
    ))
}

fn session_cookie(token: &str, max_age_secs: usize) -> Result<Cookie<'static>, ApiError> {
    let raw = format!(
        "{}={}; Path=/; HttpOnly; Secure; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    );
    Cookie::parse(raw).map_err(|err| ApiError::Internal(anyhow::anyhow!("bad cookie: {err}")))
}

fn clear_session_cookie() -> Result<Cookie<'static>, ApiError> {
    let raw = format!(
        "{}=; Path=/; HttpOnly; Secure; SameSite=Lax; Max-Age=0",
        SESSION_COOKIE
    );
    Cookie::parse(raw).map_err(|err| ApiError::Internal(anyhow::anyhow!("bad cookie: {err}")))
}
