//! Authorization Middleware
//! Mission: Gate every protected route behind cookie-borne session tokens

use crate::api::response::ApiError;
use crate::auth::jwt::JwtManager;
use crate::models::UserRole;
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Name of the session cookie set at login and cleared at logout.
pub const SESSION_COOKIE: &str = "gatekeeper_token";

/// Authenticated identity bound to the request by `auth_middleware`.
///
/// This is the only way identity enters a handler: the extractor below
/// fails closed with 401 when the middleware has not run.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: UserRole,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .copied()
            .ok_or(ApiError::AuthenticationRequired)
    }
}

/// Validate the session cookie and bind the caller's identity.
///
/// Rejects with 401 when the cookie is missing or its token does not
/// validate. The token value itself is never logged.
pub async fn auth_middleware(
    State(jwt): State<Arc<JwtManager>>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let token = match jar.get(SESSION_COOKIE) {
        Some(cookie) => cookie.value().to_string(),
        None => {
            warn!(method = %method, path = %path, "Missing session cookie");
            return Err(ApiError::AuthenticationRequired);
        }
    };

    let claims = jwt.validate(&token).map_err(|err| {
        warn!(method = %method, path = %path, error = %err, "Invalid session token");
        ApiError::InvalidToken
    })?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| {
        warn!(method = %method, path = %path, "Token subject is not a valid id");
        ApiError::InvalidToken
    })?;

    req.extensions_mut().insert(CurrentUser {
        id: user_id,
        role: claims.role,
    });

    Ok(next.run(req).await)
}

/// Role set a route admits. Plain membership, no hierarchy.
#[derive(Debug, Clone, Copy)]
pub struct RequiredRoles(pub &'static [UserRole]);

/// Enforce that the bound identity holds one of the required roles.
///
/// Must be layered inside `auth_middleware`; an absent identity fails
/// closed with 401 rather than assuming anything about the caller.
pub async fn require_any_role(
    State(RequiredRoles(required)): State<RequiredRoles>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .copied()
        .ok_or(ApiError::AuthenticationRequired)?;

    if !required.contains(&user.role) {
        let required_roles = required
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        warn!(
            method = %req.method(),
            path = %req.uri().path(),
            user_role = user.role.as_str(),
            required_roles = %required_roles,
            "Insufficient permissions"
        );
        return Err(ApiError::InsufficientPermissions);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;

    #[tokio::test]
    async fn test_extractor_fails_closed_without_identity() {
        let req = HttpRequest::new(Body::empty());
        let (mut parts, _) = req.into_parts();

        let result = CurrentUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(ApiError::AuthenticationRequired)));
    }

    #[tokio::test]
    async fn test_extractor_returns_bound_identity() {
        let mut req = HttpRequest::new(Body::empty());
        let user = CurrentUser {
            id: Uuid::new_v4(),
            role: UserRole::Owner,
        };
        req.extensions_mut().insert(user);
        let (mut parts, _) = req.into_parts();

        let extracted = CurrentUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(extracted.id, user.id);
        assert_eq!(extracted.role, UserRole::Owner);
    }
}
