use sqlx::PgExecutor;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Category, CategoryStatus, CategoryWithCount};

const COLUMNS: &str = "id, name, description, icon, status, is_deleted, organization_id, created_at, updated_at";

/// Unique index over live (organization_id, name) pairs, for conflict reporting
pub const NAME_CONSTRAINT: &str = "categories_organization_name_key";

#[derive(Debug, Clone)]
pub struct NewCategory<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub icon: Option<&'a str>,
    pub status: CategoryStatus,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub status: Option<CategoryStatus>,
}

/// Live categories of an organization with their live article counts, by name
pub async fn list_with_counts<'e, E>(
    executor: E,
    organization_id: Uuid,
) -> Result<Vec<CategoryWithCount>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let categories = sqlx::query_as::<_, CategoryWithCount>(
        "SELECT c.id, c.name, c.description, c.icon, c.status, c.is_deleted,
                c.organization_id, c.created_at, c.updated_at,
                COUNT(a.id) AS article_count
         FROM categories c
         LEFT JOIN articles a ON a.category_id = c.id AND a.is_deleted = false
         WHERE c.organization_id = $1 AND c.is_deleted = false
         GROUP BY c.id
         ORDER BY c.name ASC",
    )
    .bind(organization_id)
    .fetch_all(executor)
    .await?;
    Ok(categories)
}

/// A live category of the organization
pub async fn find<'e, E>(executor: E, organization_id: Uuid, id: Uuid) -> Result<Option<Category>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "SELECT {COLUMNS} FROM categories
         WHERE id = $1 AND organization_id = $2 AND is_deleted = false"
    );
    let category = sqlx::query_as::<_, Category>(&sql)
        .bind(id)
        .bind(organization_id)
        .fetch_optional(executor)
        .await?;
    Ok(category)
}

pub async fn create<'e, E>(
    executor: E,
    organization_id: Uuid,
    new_category: NewCategory<'_>,
) -> Result<Category, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "INSERT INTO categories (name, description, icon, status, organization_id)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {COLUMNS}"
    );
    let category = sqlx::query_as::<_, Category>(&sql)
        .bind(new_category.name)
        .bind(new_category.description)
        .bind(new_category.icon)
        .bind(new_category.status.as_str())
        .bind(organization_id)
        .fetch_one(executor)
        .await?;
    Ok(category)
}

/// Insert a category unless one with the same name already exists in the
/// organization (deleted or not). Returns true when a row was inserted.
pub async fn ensure<'e, E>(
    executor: E,
    organization_id: Uuid,
    new_category: NewCategory<'_>,
) -> Result<bool, DatabaseError>
where
    E: PgExecutor<'e>,
{
    // The unique index only covers live rows, so deleted names need the explicit check
    let result = sqlx::query(
        "INSERT INTO categories (name, description, icon, status, organization_id)
         SELECT $1, $2, $3, $4, $5
         WHERE NOT EXISTS (
             SELECT 1 FROM categories WHERE organization_id = $5 AND name = $1
         )
         ON CONFLICT DO NOTHING",
    )
    .bind(new_category.name)
    .bind(new_category.description)
    .bind(new_category.icon)
    .bind(new_category.status.as_str())
    .bind(organization_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn update<'e, E>(
    executor: E,
    organization_id: Uuid,
    id: Uuid,
    changes: &CategoryChanges,
) -> Result<Option<Category>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "UPDATE categories SET
             name = COALESCE($3, name),
             description = COALESCE($4, description),
             icon = COALESCE($5, icon),
             status = COALESCE($6, status),
             updated_at = now()
         WHERE id = $1 AND organization_id = $2 AND is_deleted = false
         RETURNING {COLUMNS}"
    );
    let category = sqlx::query_as::<_, Category>(&sql)
        .bind(id)
        .bind(organization_id)
        .bind(changes.name.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.icon.as_deref())
        .bind(changes.status.map(|s| s.as_str()))
        .fetch_optional(executor)
        .await?;
    Ok(category)
}

pub async fn soft_delete<'e, E>(executor: E, organization_id: Uuid, id: Uuid) -> Result<bool, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE categories SET is_deleted = true, updated_at = now()
         WHERE id = $1 AND organization_id = $2 AND is_deleted = false",
    )
    .bind(id)
    .bind(organization_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}
