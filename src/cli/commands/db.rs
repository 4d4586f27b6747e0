use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;
use crate::database::DatabaseManager;

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Connect using DATABASE_URL and report the outcome")]
    Check,

    #[command(about = "Apply the embedded schema migrations")]
    Migrate,
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let url = config::config()
        .database
        .url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is not set"))?;
    let redacted = DatabaseManager::redact_url(url);

    let result = match cmd {
        DbCommands::Check => {
            DatabaseManager::health_check().await?;
            output_success(
                output_format,
                &format!("Connected to {}", redacted),
                Some(json!({ "url": redacted })),
            )
        }
        DbCommands::Migrate => {
            DatabaseManager::migrate().await?;
            output_success(
                output_format,
                &format!("Migrations applied to {}", redacted),
                Some(json!({ "url": redacted })),
            )
        }
    };

    DatabaseManager::close().await;
    result
}
