use std::sync::Arc;

use axum::extract::State;
use medley_core::models::UserResponse;
use medley_core::AppError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::response::ApiResponse;
use crate::state::AppState;

const BASE_PATH: &str = "/auth/login";

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthPayload {
    pub user: UserResponse,
    pub access_token: String,
}

/// Login: verify the password against the stored bcrypt hash and issue a
/// bearer token. The same message covers unknown email and wrong password.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthPayload),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<ApiResponse<AuthPayload>, HttpAppError> {
    let user = state
        .users
        .find_by_email(&body.email)
        .await
        .map_err(|e| HttpAppError::at(e, BASE_PATH))?
        .ok_or_else(|| {
            HttpAppError::at(
                AppError::Unauthenticated("Invalid email or password".to_string()),
                BASE_PATH,
            )
        })?;

    let password_ok = bcrypt::verify(&body.password, &user.password_hash).map_err(|e| {
        HttpAppError::at(
            AppError::Internal(format!("Password verification failed: {}", e)),
            BASE_PATH,
        )
    })?;
    if !password_ok {
        return Err(HttpAppError::at(
            AppError::Unauthenticated("Invalid email or password".to_string()),
            BASE_PATH,
        ));
    }

    let access_token = state
        .jwt
        .issue(&user)
        .map_err(|e| HttpAppError::at(e, BASE_PATH))?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(ApiResponse::success(
        AuthPayload {
            user: user.into(),
            access_token,
        },
        "Login successful",
        BASE_PATH,
    ))
}
