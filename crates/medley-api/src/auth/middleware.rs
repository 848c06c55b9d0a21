//! Bearer authentication middleware.
//!
//! Extracts the bearer token, verifies it, then resolves the principal with a
//! fresh lookup of the user row. The lookup is deliberately redundant with
//! the claim set: a token issued before a role downgrade or account removal
//! must not retain its old access. A missing or invalid token on a protected
//! route is Unauthenticated (401), never Forbidden.

use std::sync::Arc;

use axum::{
    extract::{MatchedPath, Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};
use medley_core::AppError;
use medley_db::UserRepository;

use crate::auth::jwt::JwtService;
use crate::auth::models::CurrentUser;
use crate::error::HttpAppError;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<JwtService>,
    pub users: UserRepository,
}

/// Routes reachable without a credential, keyed by method and route
/// template. Everything else requires a verified bearer token and a
/// resolvable principal.
fn is_public(method: &Method, route: &str) -> bool {
    matches!(
        (method.as_str(), route),
        ("POST", "/api/auth/login")
            | ("POST", "/api/users")
            | ("GET", "/health")
            | ("GET", "/api/openapi.json")
    )
}

pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| path.clone());

    if is_public(request.method(), &route) {
        return next.run(request).await;
    }

    let header = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match authenticate(&auth_state, header).await {
        Ok(principal) => {
            tracing::debug!(
                user_id = principal.id,
                role = %principal.role,
                "Authenticated request"
            );
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(e) => HttpAppError::at(e, path).into_response(),
    }
}

async fn authenticate(
    auth_state: &AuthState,
    header: Option<&str>,
) -> Result<CurrentUser, AppError> {
    let header = header.ok_or_else(|| {
        AppError::Unauthenticated("Missing authorization header".to_string())
    })?;

    let token = header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Unauthenticated("Invalid authorization header format".to_string())
    })?;

    let claims = auth_state.jwt.verify(token)?;

    // Fresh lookup: role and status come from the current row, not the token.
    let user = auth_state
        .users
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("Account no longer exists".to_string()))?;

    Ok(CurrentUser::from(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_route_table() {
        assert!(is_public(&Method::POST, "/api/auth/login"));
        assert!(is_public(&Method::POST, "/api/users"));
        assert!(is_public(&Method::GET, "/health"));
        // Listing users is protected even though signup on the same path
        // is public.
        assert!(!is_public(&Method::GET, "/api/users"));
        assert!(!is_public(&Method::POST, "/api/media"));
    }
}
