use sqlx::PgExecutor;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Role, User, UserStatus};

pub const EMAIL_CONSTRAINT: &str = "users_email_key";
pub const PRIMARY_KEY_CONSTRAINT: &str = "users_pkey";

const COLUMNS: &str = "id, email, password, first_name, last_name, role, status, is_deleted, \
                       organization_id, created_at, updated_at";

/// Values for a new user row. `id` is optional so externally-issued ids can be kept.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub id: Option<Uuid>,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub role: Role,
    pub organization_id: Uuid,
}

/// Partial update; `None` leaves a column unchanged
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

/// Look a user up by email regardless of organization (emails are globally unique)
pub async fn find_by_email<'e, E>(executor: E, email: &str) -> Result<Option<User>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(executor)
        .await?;
    Ok(user)
}

pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<User>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(user)
}

/// Live (not soft-deleted) users of an organization
pub async fn list<'e, E>(executor: E, organization_id: Uuid) -> Result<Vec<User>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "SELECT {COLUMNS} FROM users
         WHERE organization_id = $1 AND is_deleted = false
         ORDER BY created_at ASC"
    );
    let users = sqlx::query_as::<_, User>(&sql)
        .bind(organization_id)
        .fetch_all(executor)
        .await?;
    Ok(users)
}

pub async fn create<'e, E>(executor: E, new_user: NewUser<'_>) -> Result<User, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "INSERT INTO users (id, email, password, first_name, last_name, role, organization_id)
         VALUES (COALESCE($1, gen_random_uuid()), $2, $3, $4, $5, $6, $7)
         RETURNING {COLUMNS}"
    );
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(new_user.id)
        .bind(new_user.email)
        .bind(new_user.password_hash)
        .bind(new_user.first_name)
        .bind(new_user.last_name)
        .bind(new_user.role.as_str())
        .bind(new_user.organization_id)
        .fetch_one(executor)
        .await?;
    Ok(user)
}

/// Apply a partial update to a live user of the organization
pub async fn update<'e, E>(
    executor: E,
    organization_id: Uuid,
    id: Uuid,
    changes: &UserChanges,
) -> Result<Option<User>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "UPDATE users SET
             first_name = COALESCE($3, first_name),
             last_name = COALESCE($4, last_name),
             role = COALESCE($5, role),
             status = COALESCE($6, status),
             updated_at = now()
         WHERE id = $1 AND organization_id = $2 AND is_deleted = false
         RETURNING {COLUMNS}"
    );
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .bind(organization_id)
        .bind(changes.first_name.as_deref())
        .bind(changes.last_name.as_deref())
        .bind(changes.role.map(|r| r.as_str()))
        .bind(changes.status.map(|s| s.as_str()))
        .fetch_optional(executor)
        .await?;
    Ok(user)
}

/// Overwrite the role of a user; used when the identity provider reports a new role
pub async fn set_role<'e, E>(executor: E, id: Uuid, role: Role) -> Result<User, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!("UPDATE users SET role = $2, updated_at = now() WHERE id = $1 RETURNING {COLUMNS}");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .bind(role.as_str())
        .fetch_one(executor)
        .await?;
    Ok(user)
}

/// Mark a user deleted. Returns false when no live user matched.
pub async fn soft_delete<'e, E>(executor: E, organization_id: Uuid, id: Uuid) -> Result<bool, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE users SET is_deleted = true, updated_at = now()
         WHERE id = $1 AND organization_id = $2 AND is_deleted = false",
    )
    .bind(id)
    .bind(organization_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}
