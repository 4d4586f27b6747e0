use sqlx::PgExecutor;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::Organization;

const COLUMNS: &str = "id, name, slug, created_at, updated_at";

/// Oldest organization, used as the home of auto-provisioned users
pub async fn first<'e, E>(executor: E) -> Result<Option<Organization>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!("SELECT {COLUMNS} FROM organizations ORDER BY created_at ASC, id ASC LIMIT 1");
    let org = sqlx::query_as::<_, Organization>(&sql)
        .fetch_optional(executor)
        .await?;
    Ok(org)
}

pub async fn list<'e, E>(executor: E) -> Result<Vec<Organization>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!("SELECT {COLUMNS} FROM organizations ORDER BY created_at ASC, id ASC");
    let orgs = sqlx::query_as::<_, Organization>(&sql).fetch_all(executor).await?;
    Ok(orgs)
}

pub async fn find<'e, E>(executor: E, id: Uuid) -> Result<Option<Organization>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!("SELECT {COLUMNS} FROM organizations WHERE id = $1");
    let org = sqlx::query_as::<_, Organization>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(org)
}

pub async fn create<'e, E>(executor: E, name: &str, slug: &str) -> Result<Organization, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!("INSERT INTO organizations (name, slug) VALUES ($1, $2) RETURNING {COLUMNS}");
    let org = sqlx::query_as::<_, Organization>(&sql)
        .bind(name)
        .bind(slug)
        .fetch_one(executor)
        .await?;
    Ok(org)
}
