use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::DatabaseManager;
use crate::services::seed::{self, DEMO_PASSWORD};

#[derive(Subcommand)]
pub enum SeedCommands {
    #[command(about = "Ensure every organization has the default categories")]
    Categories,

    #[command(about = "Create the demo organization, accounts and a sample article")]
    Demo,
}

pub async fn handle(cmd: SeedCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::pool()?;

    let result = match cmd {
        SeedCommands::Categories => {
            let report = seed::seed_default_categories(&pool).await?;
            output_success(
                output_format,
                &format!(
                    "Created {} categories across {} organizations",
                    report.created, report.organizations
                ),
                Some(json!({ "report": report })),
            )
        }
        SeedCommands::Demo => {
            let accounts = seed::seed_demo_content(&pool).await?;
            output_success(
                output_format,
                &format!(
                    "Seeded {} with {} and {} (password {})",
                    accounts.organization.slug, accounts.admin.email, accounts.user.email, DEMO_PASSWORD
                ),
                Some(json!({
                    "organization": accounts.organization,
                    "adminEmail": accounts.admin.email,
                    "userEmail": accounts.user.email,
                })),
            )
        }
    };

    DatabaseManager::close().await;
    result
}
