use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{IdpClaims, EXTERNAL_AUTH_MARKER};
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Organization, Role, User};
use crate::database::users::NewUser;
use crate::database::{organizations, users};

const DEFAULT_ORG_NAME: &str = "Default Organization";
const DEFAULT_ORG_SLUG: &str = "default";

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("token carries no email")]
    MissingEmail,
    #[error("account {0} is disabled")]
    Disabled(String),
    #[error("account could not be provisioned")]
    Conflict,
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for ProvisionError {
    fn from(err: sqlx::Error) -> Self {
        ProvisionError::Database(err.into())
    }
}

/// Map an identity-provider token to a local user, creating the user on
/// first sight and syncing the role on later visits.
pub async fn provision(claims: &IdpClaims) -> Result<User, ProvisionError> {
    let email = claims
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or(ProvisionError::MissingEmail)?;

    let pool = DatabaseManager::pool()?;
    let role = claims.role();

    let user = match users::find_by_email(&pool, email).await? {
        Some(user) if user.is_disabled() => return Err(ProvisionError::Disabled(user.email)),
        Some(user) if user.role != role => {
            info!("Syncing role of {} from {} to {}", user.email, user.role, role);
            users::set_role(&pool, user.id, role).await?
        }
        Some(user) => user,
        None => create_from_claims(&pool, claims, email, role).await?,
    };

    Ok(user)
}

/// Result of one provisioning insert
#[derive(Debug)]
enum Insert {
    Created(User),
    EmailTaken,
    IdTaken,
}

/// Which unique key a failed provisioning insert ran into
fn collision(constraint: Option<&str>) -> Option<Insert> {
    match constraint {
        Some(users::EMAIL_CONSTRAINT) => Some(Insert::EmailTaken),
        Some(users::PRIMARY_KEY_CONSTRAINT) => Some(Insert::IdTaken),
        _ => None,
    }
}

async fn create_from_claims(
    pool: &PgPool,
    claims: &IdpClaims,
    email: &str,
    role: Role,
) -> Result<User, ProvisionError> {
    // Keep the provider's id when it is a UUID so both systems agree on identity
    let preferred_id = claims.sub.as_deref().and_then(|sub| sub.parse::<Uuid>().ok());

    let mut outcome = insert_user(pool, claims, email, role, preferred_id).await?;
    if matches!(outcome, Insert::IdTaken) && preferred_id.is_some() {
        // Same subject under a new email; the existing row keeps the id
        warn!("Provider id of {} already belongs to another user; assigning a new id", email);
        outcome = insert_user(pool, claims, email, role, None).await?;
    }

    match outcome {
        Insert::Created(user) => Ok(user),
        // A concurrent request provisioned the same email first
        Insert::EmailTaken => match users::find_by_email(pool, email).await? {
            Some(user) if user.is_disabled() => Err(ProvisionError::Disabled(user.email)),
            Some(user) => Ok(user),
            None => Err(ProvisionError::Conflict),
        },
        Insert::IdTaken => Err(ProvisionError::Conflict),
    }
}

async fn insert_user(
    pool: &PgPool,
    claims: &IdpClaims,
    email: &str,
    role: Role,
    id: Option<Uuid>,
) -> Result<Insert, ProvisionError> {
    let mut tx = pool.begin().await?;
    let org = home_organization(&mut tx).await?;

    let created = users::create(
        &mut *tx,
        NewUser {
            id,
            email,
            password_hash: EXTERNAL_AUTH_MARKER,
            first_name: claims.first_name(),
            last_name: claims.last_name(),
            role,
            organization_id: org.id,
        },
    )
    .await;

    match created {
        Ok(user) => {
            tx.commit().await?;
            info!("Provisioned {} ({}) into organization {}", user.email, user.role, org.slug);
            Ok(Insert::Created(user))
        }
        Err(DatabaseError::Sqlx(sqlx::Error::Database(db_err))) if db_err.is_unique_violation() => {
            tx.rollback().await?;
            collision(db_err.constraint()).ok_or_else(|| {
                DatabaseError::Sqlx(sqlx::Error::Database(db_err)).into()
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// Organization that receives auto-provisioned users: the oldest one, or a
/// freshly created default when none exist yet.
async fn home_organization(conn: &mut sqlx::PgConnection) -> Result<Organization, DatabaseError> {
    if let Some(org) = organizations::first(&mut *conn).await? {
        return Ok(org);
    }
    info!("No organization found; creating '{}'", DEFAULT_ORG_NAME);
    organizations::create(&mut *conn, DEFAULT_ORG_NAME, DEFAULT_ORG_SLUG).await
}
