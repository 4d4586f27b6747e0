// handlers/protected/articles.rs - /api/articles handlers
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query,
    },
    Extension, Json,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::articles::{self, ArticleChanges, ArticleFilter, NewArticle};
use crate::database::models::{ArticleStatus, ArticleView};
use crate::database::{categories, DatabaseManager};
use crate::error::ApiError;
use crate::handlers::validation::{body_id, non_blank, path_id, required};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Message};

const NOT_FOUND: &str = "Article not found";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleQuery {
    pub search: Option<String>,
    pub category_id: Option<String>,
    pub status: Option<String>,
}

impl ArticleQuery {
    fn into_filter(self) -> Result<ArticleFilter, ApiError> {
        let category_id = match self.category_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(body_id("categoryId", raw)?),
        };
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<ArticleStatus>()
                    .map_err(|e| ApiError::field_error("status", e.to_string()))?,
            ),
        };

        Ok(ArticleFilter {
            search: self.search,
            category_id,
            status,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<String>,
    pub status: Option<ArticleStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<String>,
    pub status: Option<ArticleStatus>,
}

/// GET /api/articles - Search the organization's articles
pub async fn list(
    Extension(auth): Extension<AuthUser>,
    query: Result<Query<ArticleQuery>, QueryRejection>,
) -> ApiResult<Vec<ArticleView>> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let filter = query.into_filter()?;

    let pool = DatabaseManager::pool()?;
    let found = articles::list(&pool, auth.org_id, &filter).await?;
    tracing::debug!("Found {} articles for org {}", found.len(), auth.org_id);

    Ok(ApiResponse::success(found))
}

/// GET /api/articles/:id
pub async fn get(Extension(auth): Extension<AuthUser>, Path(id): Path<String>) -> ApiResult<ArticleView> {
    let id = path_id(&id, NOT_FOUND)?;
    let pool = DatabaseManager::pool()?;
    Ok(ApiResponse::success(load_view(&pool, auth.org_id, id).await?))
}

/// POST /api/articles - Publish a new article authored by the caller
pub async fn create(
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<CreateArticleRequest>, JsonRejection>,
) -> ApiResult<ArticleView> {
    let Json(request) = payload?;
    let title = required("title", request.title)?;
    let category_id = body_id("categoryId", &required("categoryId", request.category_id)?)?;
    let content = request.content.unwrap_or_default();

    let pool = DatabaseManager::pool()?;
    ensure_category(&pool, auth.org_id, category_id).await?;

    let article = articles::create(
        &pool,
        auth.org_id,
        NewArticle {
            title: &title,
            content: &content,
            category_id,
            status: request.status.unwrap_or_default(),
            author_id: auth.id,
        },
    )
    .await?;
    tracing::info!("Article {} created by {} in org {}", article.id, auth.email, auth.org_id);

    Ok(ApiResponse::created(load_view(&pool, auth.org_id, article.id).await?))
}

/// PUT /api/articles/:id - Partial update; absent fields are left alone
pub async fn update(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateArticleRequest>, JsonRejection>,
) -> ApiResult<ArticleView> {
    let id = path_id(&id, NOT_FOUND)?;
    let Json(request) = payload?;

    let category_id = match request.category_id {
        Some(raw) => Some(body_id("categoryId", &raw)?),
        None => None,
    };
    let changes = ArticleChanges {
        title: non_blank("title", request.title)?,
        content: request.content,
        category_id,
        status: request.status,
    };

    let pool = DatabaseManager::pool()?;
    if let Some(category_id) = changes.category_id {
        ensure_category(&pool, auth.org_id, category_id).await?;
    }

    articles::update(&pool, auth.org_id, id, &changes)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    tracing::info!("Article {} updated by {}", id, auth.email);

    Ok(ApiResponse::success(load_view(&pool, auth.org_id, id).await?))
}

/// DELETE /api/articles/:id - Soft delete
pub async fn delete(Extension(auth): Extension<AuthUser>, Path(id): Path<String>) -> ApiResult<Message> {
    let id = path_id(&id, NOT_FOUND)?;
    let pool = DatabaseManager::pool()?;

    if !articles::soft_delete(&pool, auth.org_id, id).await? {
        return Err(ApiError::not_found(NOT_FOUND));
    }
    tracing::info!("Article {} deleted by {}", id, auth.email);

    Ok(ApiResponse::success(Message::new("Article deleted")))
}

async fn load_view(pool: &PgPool, org_id: Uuid, id: Uuid) -> Result<ArticleView, ApiError> {
    articles::find(pool, org_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}

/// Articles may only be filed under a live category of the same organization
async fn ensure_category(pool: &PgPool, org_id: Uuid, category_id: Uuid) -> Result<(), ApiError> {
    match categories::find(pool, org_id, category_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::field_error("categoryId", "Category not found")),
    }
}
