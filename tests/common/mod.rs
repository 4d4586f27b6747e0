#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-secret";
pub const IDP_SECRET: &str = "integration-idp-secret";

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn(extra_env: &[(&str, &str)]) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_knowledge-hub-api"));
        cmd.env("KB_API_PORT", port.to_string())
            .env("APP_ENV", "development")
            .env("JWT_SECRET", JWT_SECRET)
            .env("IDP_JWT_SECRET", IDP_SECRET)
            .env("SECURITY_ALLOW_UNVERIFIED_IDP_TOKENS", "false")
            .env("SEED_ALLOW_ENDPOINT", "true")
            .envs(extra_env.iter().copied())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // DATABASE_URL is inherited (or read from .env by the server)
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/api/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    ensure_server_with(&[]).await
}

/// Like `ensure_server`, with extra environment for the first spawn in this test binary
pub async fn ensure_server_with(extra_env: &[(&str, &str)]) -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn(extra_env).expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(30)).await?;
    Ok(server)
}

/// Database-backed tests only run when DATABASE_URL is available
pub fn database_configured() -> bool {
    let _ = dotenvy::dotenv();
    std::env::var("DATABASE_URL").map(|v| !v.trim().is_empty()).unwrap_or(false)
}

/// Unique suffix so repeated runs against one database do not collide
pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

/// Token signed the way the identity provider signs them
pub fn idp_token(email: &str, role: &str) -> String {
    idp_token_with_sub(&Uuid::new_v4().to_string(), email, role)
}

pub fn idp_token_with_sub(sub: &str, email: &str, role: &str) -> String {
    let claims = json!({
        "sub": sub,
        "email": email,
        "aud": "authenticated",
        "exp": chrono::Utc::now().timestamp() + 3600,
        "user_metadata": { "firstName": "Test", "lastName": "Runner", "role": role }
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(IDP_SECRET.as_bytes()))
        .expect("encode identity provider token")
}

/// Token signed with the server's own secret for a user that need not exist
pub fn local_token(role: &str) -> String {
    local_token_for(Uuid::new_v4(), role, Uuid::new_v4())
}

pub fn local_token_for(id: Uuid, role: &str, org_id: Uuid) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = json!({
        "id": id,
        "email": "local@kb.com",
        "role": role,
        "orgId": org_id,
        "iat": now,
        "exp": now + 3600,
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(JWT_SECRET.as_bytes()))
        .expect("encode local token")
}

/// Freshly provisioned administrator of the default organization
pub fn admin_token() -> String {
    idp_token(&format!("{}@corp.example", unique("admin")), "ADMIN")
}

pub async fn json_body(res: reqwest::Response) -> Result<(StatusCode, Value)> {
    let status = res.status();
    let body = res.json::<Value>().await.unwrap_or(Value::Null);
    Ok((status, body))
}
