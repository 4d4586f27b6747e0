use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::auth::{verify_local, IdpVerifier, LocalClaims};
use crate::config;
use crate::database::models::{Role, User};
use crate::database::{users, DatabaseManager};
use crate::error::ApiError;
use crate::services::provisioning;

/// Roles allowed through `authorize` on administrative routes
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Authenticated identity attached to every protected request
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub org_id: Uuid,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<LocalClaims> for AuthUser {
    fn from(claims: LocalClaims) -> Self {
        Self {
            id: claims.id,
            email: claims.email,
            role: claims.role,
            org_id: claims.org_id,
        }
    }
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            org_id: user.organization_id,
        }
    }
}

/// Resolve the bearer token to an `AuthUser`.
///
/// Tokens signed with the local secret are trusted as-is, or checked against
/// the user row when `revalidate_local_tokens` is on. Anything else is
/// treated as an identity-provider token and mapped to a local user,
/// provisioning one on first sight.
pub async fn authenticate(headers: HeaderMap, mut request: Request, next: Next) -> Response {
    let token = match bearer_token(&headers) {
        Some(token) => token,
        None => return ApiError::unauthorized("Unauthorized").into_response(),
    };

    match resolve_identity(token).await {
        Ok(auth_user) => {
            tracing::debug!("Authenticated {} ({}) in org {}", auth_user.email, auth_user.role, auth_user.org_id);
            request.extensions_mut().insert(auth_user);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

/// Reject identities whose role is not in the allow-list
pub async fn authorize(State(roles): State<&'static [Role]>, request: Request, next: Next) -> Response {
    let allowed = request
        .extensions()
        .get::<AuthUser>()
        .map(|user| roles.contains(&user.role))
        .unwrap_or(false);

    if !allowed {
        return ApiError::forbidden("Forbidden").into_response();
    }

    next.run(request).await
}

async fn resolve_identity(token: &str) -> Result<AuthUser, ApiError> {
    let security = &config::config().security;

    match verify_local(token, &security.jwt_secret) {
        Ok(claims) if security.revalidate_local_tokens => return current_identity(claims).await,
        Ok(claims) => return Ok(claims.into()),
        Err(e) => tracing::debug!("Not a local token ({}), trying identity provider", e),
    }

    let claims = IdpVerifier::from_config(security).verify(token)?;
    let user = provisioning::provision(&claims).await?;
    Ok(AuthUser::from(&user))
}

/// Identity of a local token as the database sees it now
async fn current_identity(claims: LocalClaims) -> Result<AuthUser, ApiError> {
    let pool = DatabaseManager::pool()?;
    match users::find_by_id(&pool, claims.id).await? {
        Some(user) if user.is_disabled() => {
            tracing::warn!("Refusing token of disabled account {}", user.email);
            Err(ApiError::forbidden("Account disabled"))
        }
        Some(user) => Ok(AuthUser::from(&user)),
        None => Err(ApiError::unauthorized("Invalid token")),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
