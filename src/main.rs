use tracing_subscriber::EnvFilter;

use knowledge_hub_api::config;
use knowledge_hub_api::database::DatabaseManager;
use knowledge_hub_api::services::seed_default_categories;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    let config = config::config();

    let default_filter = if config.api.enable_request_logging {
        "knowledge_hub_api=info,tower_http=info"
    } else {
        "knowledge_hub_api=info,tower_http=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    tracing::info!("Starting Knowledge Hub API in {:?} mode", config.environment);
    if knowledge_hub_api::is_development!() && config.security.jwt_secret == "secret" {
        tracing::warn!("Using the built-in development JWT secret; set JWT_SECRET outside local development");
    }

    prepare_database(config).await;

    let app = knowledge_hub_api::app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("KB_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Knowledge Hub API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    DatabaseManager::close().await;
    tracing::info!("Server stopped");
    Ok(())
}

/// Connection test, migrations and default categories. Every step only
/// logs on failure so the server still comes up without a database.
async fn prepare_database(config: &config::AppConfig) {
    let Some(url) = config.database.url.as_deref() else {
        tracing::warn!("DATABASE_URL is not set; database-backed routes will answer 503");
        return;
    };

    tracing::info!("Connecting to {}", DatabaseManager::redact_url(url));
    if let Err(e) = DatabaseManager::health_check().await {
        tracing::error!("Database connection failed: {}", e);
        return;
    }
    tracing::info!("Database connection successful");

    if config.database.run_migrations {
        if let Err(e) = DatabaseManager::migrate().await {
            tracing::error!("Migrations failed: {}", e);
            return;
        }
    }

    if config.seed.default_categories {
        let pool = match DatabaseManager::pool() {
            Ok(pool) => pool,
            Err(e) => {
                tracing::error!("Seeding skipped: {}", e);
                return;
            }
        };
        match seed_default_categories(&pool).await {
            Ok(report) => tracing::info!(
                "Default categories: {} created across {} organizations",
                report.created,
                report.organizations
            ),
            Err(e) => tracing::error!("Seeding error: {}", e),
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
