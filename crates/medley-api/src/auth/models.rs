use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use medley_core::models::{User, UserRole, UserStatus};
use medley_core::AppError;

use crate::error::HttpAppError;

/// The resolved principal backing a request: always built from the current
/// user row, never from token claims, and stored in request extensions by the
/// auth middleware.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
}

impl CurrentUser {
    /// The role that counts for access decisions. Inactive accounts keep
    /// their stored role but it no longer grants anything.
    pub fn effective_role(&self) -> Option<UserRole> {
        match self.status {
            UserStatus::Active => Some(self.role),
            UserStatus::Inactive => None,
        }
    }
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        CurrentUser {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            status: user.status,
        }
    }
}

// FromRequestParts so handlers can take the principal alongside Multipart
// (Extension cannot be combined with body-consuming extractors).
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let path = parts.uri.path().to_string();
        parts.extensions.get::<CurrentUser>().cloned().ok_or_else(|| {
            HttpAppError::at(
                AppError::Unauthenticated("Missing authentication context".to_string()),
                path,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: UserRole, status: UserStatus) -> CurrentUser {
        CurrentUser {
            id: 1,
            email: "user@example.com".to_string(),
            name: None,
            role,
            status,
        }
    }

    #[test]
    fn test_effective_role_active() {
        assert_eq!(
            principal(UserRole::Admin, UserStatus::Active).effective_role(),
            Some(UserRole::Admin)
        );
    }

    #[test]
    fn test_effective_role_inactive() {
        assert_eq!(
            principal(UserRole::Admin, UserStatus::Inactive).effective_role(),
            None
        );
    }
}
