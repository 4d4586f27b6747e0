// handlers/protected/categories.rs - /api/categories handlers
use axum::{
    extract::{rejection::JsonRejection, Path},
    Extension, Json,
};
use serde::Deserialize;

use crate::database::categories::{self, CategoryChanges, NewCategory};
use crate::database::models::{Category, CategoryStatus, CategoryWithCount};
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::handlers::validation::{non_blank, path_id, required};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Message};

const NOT_FOUND: &str = "Category not found";

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub status: Option<CategoryStatus>,
}

/// GET /api/categories - Live categories with their live article counts
pub async fn list(Extension(auth): Extension<AuthUser>) -> ApiResult<Vec<CategoryWithCount>> {
    let pool = DatabaseManager::pool()?;
    let found = categories::list_with_counts(&pool, auth.org_id).await?;
    tracing::debug!("Found {} categories for org {}", found.len(), auth.org_id);
    Ok(ApiResponse::success(found))
}

/// GET /api/categories/:id
pub async fn get(Extension(auth): Extension<AuthUser>, Path(id): Path<String>) -> ApiResult<Category> {
    let id = path_id(&id, NOT_FOUND)?;
    let pool = DatabaseManager::pool()?;

    let category = categories::find(&pool, auth.org_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    Ok(ApiResponse::success(category))
}

/// POST /api/categories
pub async fn create(
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<CategoryRequest>, JsonRejection>,
) -> ApiResult<Category> {
    let Json(request) = payload?;
    let name = required("name", request.name)?;

    let pool = DatabaseManager::pool()?;
    tracing::info!("Creating category \"{}\" for org {}", name, auth.org_id);
    let category = categories::create(
        &pool,
        auth.org_id,
        NewCategory {
            name: &name,
            description: request.description.as_deref(),
            icon: request.icon.as_deref(),
            status: request.status.unwrap_or(CategoryStatus::Active),
        },
    )
    .await?;

    Ok(ApiResponse::created(category))
}

/// PUT /api/categories/:id - Partial update
pub async fn update(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<CategoryRequest>, JsonRejection>,
) -> ApiResult<Category> {
    let id = path_id(&id, NOT_FOUND)?;
    let Json(request) = payload?;
    let changes = CategoryChanges {
        name: non_blank("name", request.name)?,
        description: request.description,
        icon: request.icon,
        status: request.status,
    };

    let pool = DatabaseManager::pool()?;
    let category = categories::update(&pool, auth.org_id, id, &changes)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    tracing::info!("Category {} updated by {}", id, auth.email);

    Ok(ApiResponse::success(category))
}

/// DELETE /api/categories/:id - Soft delete; articles keep their category id
pub async fn delete(Extension(auth): Extension<AuthUser>, Path(id): Path<String>) -> ApiResult<Message> {
    let id = path_id(&id, NOT_FOUND)?;
    let pool = DatabaseManager::pool()?;

    if !categories::soft_delete(&pool, auth.org_id, id).await? {
        return Err(ApiError::not_found(NOT_FOUND));
    }
    tracing::info!("Category {} deleted by {}", id, auth.email);

    Ok(ApiResponse::success(Message::new("Category deleted")))
}
