// handlers/protected/auth/me.rs - GET /api/auth/me handler
use axum::Extension;

use crate::database::models::UserProfile;
use crate::database::{organizations, users, DatabaseManager};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/auth/me - Profile of the caller with their organization
pub async fn me_get(Extension(auth): Extension<AuthUser>) -> ApiResult<UserProfile> {
    let pool = DatabaseManager::pool()?;

    let user = users::find_by_id(&pool, auth.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    let organization = organizations::find(&pool, user.organization_id).await?;

    Ok(ApiResponse::success(UserProfile::new(user, organization)))
}
