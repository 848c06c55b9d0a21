//! Role-based access decision.
//!
//! [`authorize`] is a pure function; [`role_guard`] applies it at dispatch
//! time using the per-route requirement table below. The four distinct
//! failure reasons are part of the observable behavior and must not be
//! collapsed.

use axum::{
    extract::{MatchedPath, Request},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};
use medley_core::models::UserRole;
use medley_core::AppError;

use crate::auth::models::CurrentUser;
use crate::error::HttpAppError;

/// Per-route role requirements, keyed by method and route template. Routes
/// absent from this table require authentication only.
fn required_roles(method: &Method, route: &str) -> &'static [UserRole] {
    match (method.as_str(), route) {
        ("POST", "/api/tags")
        | ("PATCH", "/api/tags/{id}")
        | ("DELETE", "/api/tags/{id}")
        | ("DELETE", "/api/users/{id}") => &[UserRole::Admin],
        _ => &[],
    }
}

/// Decide whether a principal may proceed. Rules, in order:
/// 1. empty requirement: allow;
/// 2. no principal: forbidden ("not authenticated");
/// 3. principal without an effective role: forbidden ("no role");
/// 4. role in the requirement: allow;
/// 5. otherwise forbidden, naming the role.
pub fn authorize(
    principal: Option<&CurrentUser>,
    required: &[UserRole],
) -> Result<(), AppError> {
    if required.is_empty() {
        return Ok(());
    }

    let principal = principal
        .ok_or_else(|| AppError::Forbidden("not authenticated".to_string()))?;

    let role = principal
        .effective_role()
        .ok_or_else(|| AppError::Forbidden("no role".to_string()))?;

    if required.contains(&role) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!("role {} lacks permission", role)))
    }
}

/// Middleware enforcing the requirement table. Runs after the auth
/// middleware, so the principal (when any) is already in extensions.
pub async fn role_guard(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| path.clone());

    let required = required_roles(request.method(), &route);
    match authorize(request.extensions().get::<CurrentUser>(), required) {
        Ok(()) => next.run(request).await,
        Err(e) => HttpAppError::at(e, path).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medley_core::models::UserStatus;

    fn principal(role: UserRole, status: UserStatus) -> CurrentUser {
        CurrentUser {
            id: 7,
            email: "user@example.com".to_string(),
            name: None,
            role,
            status,
        }
    }

    #[test]
    fn test_empty_requirement_allows_anyone() {
        assert!(authorize(None, &[]).is_ok());
        assert!(authorize(
            Some(&principal(UserRole::User, UserStatus::Active)),
            &[]
        )
        .is_ok());
    }

    #[test]
    fn test_missing_principal_is_forbidden() {
        let err = authorize(None, &[UserRole::Admin]).unwrap_err();
        match err {
            AppError::Forbidden(reason) => assert_eq!(reason, "not authenticated"),
            other => panic!("Expected Forbidden, got {:?}", other),
        }
    }

    #[test]
    fn test_inactive_principal_has_no_role() {
        let p = principal(UserRole::Admin, UserStatus::Inactive);
        let err = authorize(Some(&p), &[UserRole::Admin]).unwrap_err();
        match err {
            AppError::Forbidden(reason) => assert_eq!(reason, "no role"),
            other => panic!("Expected Forbidden, got {:?}", other),
        }
    }

    #[test]
    fn test_matching_role_is_allowed() {
        let p = principal(UserRole::Admin, UserStatus::Active);
        assert!(authorize(Some(&p), &[UserRole::Admin]).is_ok());
    }

    #[test]
    fn test_insufficient_role_names_the_role() {
        let p = principal(UserRole::User, UserStatus::Active);
        let err = authorize(Some(&p), &[UserRole::Admin]).unwrap_err();
        match err {
            AppError::Forbidden(reason) => assert_eq!(reason, "role user lacks permission"),
            other => panic!("Expected Forbidden, got {:?}", other),
        }
    }

    #[test]
    fn test_decision_is_deterministic() {
        let p = principal(UserRole::User, UserStatus::Active);
        for _ in 0..3 {
            let first = authorize(Some(&p), &[UserRole::Admin]);
            let second = authorize(Some(&p), &[UserRole::Admin]);
            assert_eq!(
                first.map_err(|e| e.to_string()),
                second.map_err(|e| e.to_string())
            );
        }
    }

    #[test]
    fn test_requirement_table() {
        assert_eq!(
            required_roles(&Method::POST, "/api/tags"),
            &[UserRole::Admin]
        );
        assert_eq!(
            required_roles(&Method::DELETE, "/api/users/{id}"),
            &[UserRole::Admin]
        );
        assert!(required_roles(&Method::GET, "/api/tags").is_empty());
        assert!(required_roles(&Method::POST, "/api/media").is_empty());
    }
}
