use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{postgres::PgRow, FromRow, Row};
use uuid::Uuid;

use super::{ArticleStatus, CategoryStatus};

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    /// Rich-text HTML produced by the editor, stored verbatim
    pub content: String,
    #[sqlx(try_from = "String")]
    pub status: ArticleStatus,
    pub is_deleted: bool,
    pub category_id: Uuid,
    pub author_id: Uuid,
    pub organization_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleCategory {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub status: CategoryStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleAuthor {
    pub first_name: String,
    pub last_name: String,
}

/// Article joined with its category and author, as returned by the read endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ArticleView {
    #[serde(flatten)]
    pub article: Article,
    pub category: ArticleCategory,
    pub author: ArticleAuthor,
}

// Joined columns carry a category_ / author_ prefix; see database::articles::VIEW_COLUMNS
impl<'r> FromRow<'r, PgRow> for ArticleView {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let article = Article::from_row(row)?;

        let status: String = row.try_get("category_status")?;
        let status = status.parse::<CategoryStatus>().map_err(|e| sqlx::Error::ColumnDecode {
            index: "category_status".to_string(),
            source: Box::new(e),
        })?;

        let category = ArticleCategory {
            id: article.category_id,
            name: row.try_get("category_name")?,
            description: row.try_get("category_description")?,
            icon: row.try_get("category_icon")?,
            status,
        };

        let author = ArticleAuthor {
            first_name: row.try_get("author_first_name")?,
            last_name: row.try_get("author_last_name")?,
        };

        Ok(Self { article, category, author })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_serializes_flat_article_with_nested_relations() {
        let now = Utc::now();
        let category_id = Uuid::new_v4();
        let view = ArticleView {
            article: Article {
                id: Uuid::new_v4(),
                title: "VPN setup".to_string(),
                content: "<p>Install the client</p>".to_string(),
                status: ArticleStatus::Published,
                is_deleted: false,
                category_id,
                author_id: Uuid::new_v4(),
                organization_id: Uuid::new_v4(),
                created_at: now,
                updated_at: now,
            },
            category: ArticleCategory {
                id: category_id,
                name: "Networking".to_string(),
                description: None,
                icon: Some("network".to_string()),
                status: CategoryStatus::Active,
            },
            author: ArticleAuthor {
                first_name: "Admin".to_string(),
                last_name: "User".to_string(),
            },
        };

        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["title"], "VPN setup");
        assert_eq!(value["categoryId"], category_id.to_string());
        assert_eq!(value["isDeleted"], false);
        assert_eq!(value["status"], "PUBLISHED");
        assert_eq!(value["category"]["name"], "Networking");
        assert_eq!(value["author"]["firstName"], "Admin");
        assert!(value.get("article").is_none());
    }
}
