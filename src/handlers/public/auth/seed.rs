// handlers/public/auth/seed.rs - POST /api/auth/seed handler
use serde::Serialize;

use crate::config;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::seed_demo_accounts;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedResponse {
    pub message: &'static str,
    pub admin_email: String,
    pub user_email: String,
}

/// POST /api/auth/seed - Create the demo organization and accounts
pub async fn seed_post() -> ApiResult<SeedResponse> {
    if !config::config().seed.allow_seed_endpoint {
        return Err(ApiError::not_found("Not found"));
    }

    let pool = DatabaseManager::pool()?;
    let accounts = seed_demo_accounts(&pool).await?;

    Ok(ApiResponse::success(SeedResponse {
        message: "Seed successful",
        admin_email: accounts.admin.email,
        user_email: accounts.user.email,
    }))
}

