use sqlx::PgExecutor;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Article, ArticleStatus, ArticleView};

const COLUMNS: &str = "id, title, content, status, is_deleted, category_id, author_id, \
                       organization_id, created_at, updated_at";

/// Select list for ArticleView: article columns plus prefixed category and author columns
const VIEW_COLUMNS: &str = "a.id, a.title, a.content, a.status, a.is_deleted, a.category_id, a.author_id,
        a.organization_id, a.created_at, a.updated_at,
        c.name AS category_name, c.description AS category_description,
        c.icon AS category_icon, c.status AS category_status,
        u.first_name AS author_first_name, u.last_name AS author_last_name";

const VIEW_FROM: &str = "articles a
        JOIN categories c ON c.id = a.category_id
        JOIN users u ON u.id = a.author_id";

/// Optional narrowing of the article list
#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    /// Substring matched against title, content and category name
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub status: Option<ArticleStatus>,
}

#[derive(Debug, Clone)]
pub struct NewArticle<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub category_id: Uuid,
    pub status: ArticleStatus,
    pub author_id: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct ArticleChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<Uuid>,
    pub status: Option<ArticleStatus>,
}

/// Build an ILIKE pattern matching `term` anywhere, with LIKE wildcards in
/// the term treated literally.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Live articles of the organization, most recently updated first
pub async fn list<'e, E>(
    executor: E,
    organization_id: Uuid,
    filter: &ArticleFilter,
) -> Result<Vec<ArticleView>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let pattern = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(contains_pattern);

    let sql = format!(
        "SELECT {VIEW_COLUMNS}
         FROM {VIEW_FROM}
         WHERE a.organization_id = $1 AND a.is_deleted = false
           AND ($2::text IS NULL OR a.title ILIKE $2 OR a.content ILIKE $2 OR c.name ILIKE $2)
           AND ($3::uuid IS NULL OR a.category_id = $3)
           AND ($4::text IS NULL OR a.status = $4)
         ORDER BY a.updated_at DESC"
    );
    let articles = sqlx::query_as::<_, ArticleView>(&sql)
        .bind(organization_id)
        .bind(pattern)
        .bind(filter.category_id)
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(executor)
        .await?;
    Ok(articles)
}

pub async fn find<'e, E>(executor: E, organization_id: Uuid, id: Uuid) -> Result<Option<ArticleView>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "SELECT {VIEW_COLUMNS}
         FROM {VIEW_FROM}
         WHERE a.id = $1 AND a.organization_id = $2 AND a.is_deleted = false"
    );
    let article = sqlx::query_as::<_, ArticleView>(&sql)
        .bind(id)
        .bind(organization_id)
        .fetch_optional(executor)
        .await?;
    Ok(article)
}

pub async fn create<'e, E>(
    executor: E,
    organization_id: Uuid,
    new_article: NewArticle<'_>,
) -> Result<Article, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "INSERT INTO articles (title, content, category_id, status, author_id, organization_id)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {COLUMNS}"
    );
    let article = sqlx::query_as::<_, Article>(&sql)
        .bind(new_article.title)
        .bind(new_article.content)
        .bind(new_article.category_id)
        .bind(new_article.status.as_str())
        .bind(new_article.author_id)
        .bind(organization_id)
        .fetch_one(executor)
        .await?;
    Ok(article)
}

pub async fn update<'e, E>(
    executor: E,
    organization_id: Uuid,
    id: Uuid,
    changes: &ArticleChanges,
) -> Result<Option<Article>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "UPDATE articles SET
             title = COALESCE($3, title),
             content = COALESCE($4, content),
             category_id = COALESCE($5, category_id),
             status = COALESCE($6, status),
             updated_at = now()
         WHERE id = $1 AND organization_id = $2 AND is_deleted = false
         RETURNING {COLUMNS}"
    );
    let article = sqlx::query_as::<_, Article>(&sql)
        .bind(id)
        .bind(organization_id)
        .bind(changes.title.as_deref())
        .bind(changes.content.as_deref())
        .bind(changes.category_id)
        .bind(changes.status.map(|s| s.as_str()))
        .fetch_optional(executor)
        .await?;
    Ok(article)
}

pub async fn soft_delete<'e, E>(executor: E, organization_id: Uuid, id: Uuid) -> Result<bool, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE articles SET is_deleted = true, updated_at = now()
         WHERE id = $1 AND organization_id = $2 AND is_deleted = false",
    )
    .bind(id)
    .bind(organization_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}
