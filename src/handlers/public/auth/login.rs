// handlers/public/auth/login.rs - POST /api/auth/login handler
use axum::{extract::rejection::JsonRejection, Json};
use serde::{Deserialize, Serialize};

use crate::auth::{issue_token, verify_password_async};
use crate::database::models::UserProfile;
use crate::database::{organizations, users, DatabaseManager};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

/// POST /api/auth/login - Exchange email and password for a session token
///
/// Unknown, deleted and inactive accounts get the same answer as a wrong
/// password.
pub async fn login_post(payload: Result<Json<LoginRequest>, JsonRejection>) -> ApiResult<LoginResponse> {
    let Json(request) = payload?;
    let (email, password) = match (request.email, request.password) {
        (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
            (email.trim().to_string(), password)
        }
        _ => return Err(ApiError::bad_request("Email and password are required")),
    };

    let pool = DatabaseManager::pool()?;
    let user = match users::find_by_email(&pool, &email).await? {
        Some(user) if !user.is_disabled() => user,
        _ => {
            tracing::info!("Login rejected for {}", email);
            return Err(invalid_credentials());
        }
    };

    if !verify_password_async(password, user.password.clone()).await {
        tracing::info!("Login rejected for {}: wrong password", email);
        return Err(invalid_credentials());
    }

    let token = issue_token(&user)?;
    let organization = organizations::find(&pool, user.organization_id).await?;
    tracing::info!("User {} signed in", user.email);

    Ok(ApiResponse::success(LoginResponse {
        token,
        user: UserProfile::new(user, organization),
    }))
}

fn invalid_credentials() -> ApiError {
    ApiError::unauthorized("Invalid credentials")
}
