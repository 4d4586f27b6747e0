// handlers/protected/users.rs - /api/users handlers (admin only)
use axum::{
    extract::{rejection::JsonRejection, Path},
    Extension, Json,
};
use serde::Deserialize;

use crate::auth::hash_password_async;
use crate::database::models::{Role, UserStatus, UserSummary};
use crate::database::users::{self, NewUser, UserChanges};
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::handlers::validation::{non_blank, path_id, required};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Message};

const NOT_FOUND: &str = "User not found";
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

/// GET /api/users
pub async fn list(Extension(auth): Extension<AuthUser>) -> ApiResult<Vec<UserSummary>> {
    let pool = DatabaseManager::pool()?;
    let found = users::list(&pool, auth.org_id).await?;
    Ok(ApiResponse::success(found.into_iter().map(UserSummary::from).collect()))
}

/// POST /api/users - Create a password account in the caller's organization
pub async fn create(
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<UserSummary> {
    let Json(request) = payload?;

    let email = required("email", request.email)?;
    if !looks_like_email(&email) {
        return Err(ApiError::field_error("email", "email must be a valid address"));
    }
    let password = request.password.unwrap_or_default();
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::field_error(
            "password",
            format!("password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    let first_name = required("firstName", request.first_name)?;
    let last_name = request.last_name.map(|n| n.trim().to_string()).unwrap_or_default();
    let role = request.role.unwrap_or_default();

    let password_hash = hash_password_async(password).await?;
    let pool = DatabaseManager::pool()?;
    let user = users::create(
        &pool,
        NewUser {
            id: None,
            email: &email,
            password_hash: &password_hash,
            first_name: &first_name,
            last_name: &last_name,
            role,
            organization_id: auth.org_id,
        },
    )
    .await?;
    tracing::info!("User {} ({}) created by {}", user.email, user.role, auth.email);

    Ok(ApiResponse::created(user.into()))
}

/// PUT /api/users/:id - Partial update of profile, role and status
pub async fn update(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<UserSummary> {
    let id = path_id(&id, NOT_FOUND)?;
    let Json(request) = payload?;
    let changes = UserChanges {
        first_name: non_blank("firstName", request.first_name)?,
        last_name: request.last_name.map(|n| n.trim().to_string()),
        role: request.role,
        status: request.status,
    };

    let pool = DatabaseManager::pool()?;
    let user = users::update(&pool, auth.org_id, id, &changes)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    tracing::info!("User {} updated by {}", user.email, auth.email);

    Ok(ApiResponse::success(user.into()))
}

/// DELETE /api/users/:id - Soft delete
pub async fn delete(Extension(auth): Extension<AuthUser>, Path(id): Path<String>) -> ApiResult<Message> {
    let id = path_id(&id, NOT_FOUND)?;
    if id == auth.id {
        return Err(ApiError::bad_request("You cannot delete your own account"));
    }

    let pool = DatabaseManager::pool()?;
    if !users::soft_delete(&pool, auth.org_id, id).await? {
        return Err(ApiError::not_found(NOT_FOUND));
    }
    tracing::info!("User {} deleted by {}", id, auth.email);

    Ok(ApiResponse::success(Message::new("User deleted")))
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_check() {
        assert!(looks_like_email("jane@corp.example"));
        assert!(!looks_like_email("jane"));
        assert!(!looks_like_email("@corp.example"));
        assert!(!looks_like_email("jane@localhost"));
    }
}
