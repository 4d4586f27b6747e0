use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use tracing::info;

use crate::auth::{hash_password_async, AuthError};
use crate::database::articles::NewArticle;
use crate::database::categories::NewCategory;
use crate::database::manager::DatabaseError;
use crate::database::models::{ArticleStatus, CategoryStatus, Organization, Role, User};
use crate::database::users::NewUser;
use crate::database::{articles, categories, organizations, users};

pub struct DefaultCategory {
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

/// Categories every organization starts with
pub const DEFAULT_CATEGORIES: [DefaultCategory; 6] = [
    DefaultCategory {
        name: "Servers",
        description: "On-premise hardware, virtual machines, and server management.",
        icon: "server",
    },
    DefaultCategory {
        name: "Networking",
        description: "VPN, Switch configurations, WLAN, and internal network guides.",
        icon: "network",
    },
    DefaultCategory {
        name: "Office 365",
        description: "Exchange Online, Teams, SharePoint, and Entra ID management.",
        icon: "cloud",
    },
    DefaultCategory {
        name: "Hardware",
        description: "Asset tracking, peripheral troubleshooting, and hardware support.",
        icon: "hard-drive",
    },
    DefaultCategory {
        name: "Security",
        description: "Threat mitigation protocols, compliance standards, and security audits.",
        icon: "security",
    },
    DefaultCategory {
        name: "Mobile Devices",
        description: "Legacy documentation for enterprise mobile device management.",
        icon: "mobile",
    },
];

pub const DEMO_PASSWORD: &str = "password123";
pub const DEMO_ADMIN_EMAIL: &str = "admin@kb.com";
pub const DEMO_USER_EMAIL: &str = "user@kb.com";

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl From<sqlx::Error> for SeedError {
    fn from(err: sqlx::Error) -> Self {
        SeedError::Database(err.into())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySeedReport {
    pub organizations: usize,
    pub created: usize,
}

/// Demo organization with one administrator and one regular user
pub struct DemoAccounts {
    pub organization: Organization,
    pub admin: User,
    pub user: User,
}

/// Make sure every organization has the default categories, creating a
/// first organization when the database is empty.
pub async fn seed_default_categories(pool: &PgPool) -> Result<CategorySeedReport, DatabaseError> {
    let mut orgs = organizations::list(pool).await?;

    if orgs.is_empty() {
        info!("Creating default organization for seeding...");
        orgs.push(organizations::create(pool, "Enterprise Corp", "enterprise-corp").await?);
    }

    info!("Checking for default categories across {} organizations...", orgs.len());
    let mut created = 0;
    for org in &orgs {
        for default in DEFAULT_CATEGORIES.iter() {
            let inserted = categories::ensure(
                pool,
                org.id,
                NewCategory {
                    name: default.name,
                    description: Some(default.description),
                    icon: Some(default.icon),
                    status: CategoryStatus::Active,
                },
            )
            .await?;

            if inserted {
                info!("Seeded category: {} for org {}", default.name, org.name);
                created += 1;
            }
        }
    }
    info!("Category check complete.");

    Ok(CategorySeedReport {
        organizations: orgs.len(),
        created,
    })
}

/// Names the demo organization and its accounts are created under
#[derive(Debug, Clone, Copy)]
pub struct DemoSeed<'a> {
    pub organization_name: &'a str,
    pub organization_slug: &'a str,
    pub admin_email: &'a str,
    pub user_email: &'a str,
}

impl Default for DemoSeed<'static> {
    fn default() -> Self {
        Self {
            organization_name: "KB Enterprise",
            organization_slug: "kb-enterprise",
            admin_email: DEMO_ADMIN_EMAIL,
            user_email: DEMO_USER_EMAIL,
        }
    }
}

/// Create the demo organization and its two accounts
pub async fn seed_demo_accounts(pool: &PgPool) -> Result<DemoAccounts, SeedError> {
    seed_demo(pool, DemoSeed::default(), false).await
}

/// Demo accounts plus a starter category and article
pub async fn seed_demo_content(pool: &PgPool) -> Result<DemoAccounts, SeedError> {
    seed_demo(pool, DemoSeed::default(), true).await
}

/// All rows of one demo seed commit together or not at all
pub async fn seed_demo(pool: &PgPool, seed: DemoSeed<'_>, with_content: bool) -> Result<DemoAccounts, SeedError> {
    let password_hash = hash_password_async(DEMO_PASSWORD.to_string()).await?;

    let mut tx = pool.begin().await?;
    let accounts = create_demo_accounts(&mut tx, seed, &password_hash).await?;
    if with_content {
        create_demo_content(&mut tx, &accounts).await?;
    }
    tx.commit().await?;

    info!(
        "Seeded demo organization {} with {} and {}",
        accounts.organization.slug, accounts.admin.email, accounts.user.email
    );
    Ok(accounts)
}

async fn create_demo_accounts(
    conn: &mut PgConnection,
    seed: DemoSeed<'_>,
    password_hash: &str,
) -> Result<DemoAccounts, DatabaseError> {
    let organization = organizations::create(&mut *conn, seed.organization_name, seed.organization_slug).await?;

    let admin = users::create(
        &mut *conn,
        NewUser {
            id: None,
            email: seed.admin_email,
            password_hash,
            first_name: "Admin",
            last_name: "User",
            role: Role::Admin,
            organization_id: organization.id,
        },
    )
    .await?;

    let user = users::create(
        &mut *conn,
        NewUser {
            id: None,
            email: seed.user_email,
            password_hash,
            first_name: "Normal",
            last_name: "User",
            role: Role::User,
            organization_id: organization.id,
        },
    )
    .await?;

    Ok(DemoAccounts { organization, admin, user })
}

async fn create_demo_content(conn: &mut PgConnection, accounts: &DemoAccounts) -> Result<(), DatabaseError> {
    let servers = categories::create(
        &mut *conn,
        accounts.organization.id,
        NewCategory {
            name: "Servers",
            description: Some("On-premise hardware, virtual machines, and cloud instances."),
            icon: Some("server"),
            status: CategoryStatus::Active,
        },
    )
    .await?;

    articles::create(
        &mut *conn,
        accounts.organization.id,
        NewArticle {
            title: "How to Reset O365 Password",
            content: "Step by step guide to resetting Office 365 passwords...",
            category_id: servers.id,
            status: ArticleStatus::Published,
            author_id: accounts.admin.id,
        },
    )
    .await?;
    Ok(())
}
