use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection string; `None` when DATABASE_URL is unset.
    #[serde(skip_serializing)]
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
    /// Directory holding the built single-page front end, if it should be served.
    pub static_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    /// HS256 secret of the external identity provider
    #[serde(skip_serializing)]
    pub idp_jwt_secret: Option<String>,
    pub idp_audience: Option<String>,
    /// Accept identity-provider tokens whose signature could not be verified
    pub allow_unverified_idp_tokens: bool,
    /// Re-read the user behind every local token so disabled accounts lose access immediately
    pub revalidate_local_tokens: bool,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    pub default_categories: bool,
    pub allow_seed_endpoint: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }
        if let Ok(v) = env::var("API_STATIC_DIR") {
            self.api.static_dir = if v.trim().is_empty() { None } else { Some(v) };
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Some(v) = env::var("IDP_JWT_SECRET")
            .ok()
            .or_else(|| env::var("SUPABASE_JWT_SECRET").ok())
        {
            self.security.idp_jwt_secret = if v.is_empty() { None } else { Some(v) };
        }
        if let Ok(v) = env::var("IDP_JWT_AUDIENCE") {
            self.security.idp_audience = if v.is_empty() { None } else { Some(v) };
        }
        if let Ok(v) = env::var("SECURITY_ALLOW_UNVERIFIED_IDP_TOKENS") {
            self.security.allow_unverified_idp_tokens =
                v.parse().unwrap_or(self.security.allow_unverified_idp_tokens);
        }
        if let Ok(v) = env::var("SECURITY_REVALIDATE_LOCAL_TOKENS") {
            self.security.revalidate_local_tokens = v.parse().unwrap_or(self.security.revalidate_local_tokens);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Seed overrides
        if let Ok(v) = env::var("SEED_DEFAULT_CATEGORIES") {
            self.seed.default_categories = v.parse().unwrap_or(self.seed.default_categories);
        }
        if let Ok(v) = env::var("SEED_ALLOW_ENDPOINT") {
            self.seed.allow_seed_endpoint = v.parse().unwrap_or(self.seed.allow_seed_endpoint);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
                static_dir: None,
            },
            security: SecurityConfig {
                jwt_secret: "secret".to_string(),
                jwt_expiry_hours: 24,
                idp_jwt_secret: None,
                idp_audience: None,
                allow_unverified_idp_tokens: true,
                revalidate_local_tokens: false,
                enable_cors: true,
                // Empty list means any origin
                cors_origins: vec![],
            },
            seed: SeedConfig {
                default_categories: true,
                allow_seed_endpoint: true,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                run_migrations: true,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
                static_dir: Some("dist".to_string()),
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                idp_jwt_secret: None,
                idp_audience: None,
                allow_unverified_idp_tokens: false,
                revalidate_local_tokens: true,
                enable_cors: true,
                cors_origins: vec![],
            },
            seed: SeedConfig {
                default_categories: true,
                allow_seed_endpoint: false,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
            },
            api: ApiConfig {
                enable_request_logging: false,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
                static_dir: Some("dist".to_string()),
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                idp_jwt_secret: None,
                idp_audience: None,
                allow_unverified_idp_tokens: false,
                revalidate_local_tokens: true,
                enable_cors: true,
                cors_origins: vec![],
            },
            seed: SeedConfig {
                default_categories: true,
                allow_seed_endpoint: false,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}
