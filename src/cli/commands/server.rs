use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Check server health status from the API /api/health endpoint")]
    Health {
        #[arg(long, default_value = "http://localhost:3000", help = "Base URL of the server")]
        url: String,
    },
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Health { url } => health(&url, output_format).await,
    }
}

async fn health(base_url: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let endpoint = format!("{}/api/health", base_url.trim_end_matches('/'));

    let response = match reqwest::get(&endpoint).await {
        Ok(response) => response,
        Err(e) => {
            output_error(output_format, &format!("{} unreachable: {}", endpoint, e), Some("UNREACHABLE"))?;
            anyhow::bail!("server unreachable");
        }
    };

    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);
    let database = body.get("database").and_then(Value::as_str).unwrap_or("unknown");

    if status.is_success() {
        output_success(
            output_format,
            &format!("{} is healthy (database {})", base_url, database),
            Some(json!({ "status": status.as_u16(), "health": body })),
        )
    } else {
        output_error(
            output_format,
            &format!("{} answered {} (database {})", base_url, status, database),
            Some("UNHEALTHY"),
        )?;
        anyhow::bail!("server unhealthy")
    }
}
