mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

// Every test in this binary shares one server with revalidation switched on
async fn server() -> Result<&'static common::TestServer> {
    common::ensure_server_with(&[("SECURITY_REVALIDATE_LOCAL_TOKENS", "true")]).await
}

async fn sign_in(client: &reqwest::Client, server: &common::TestServer, email: &str) -> Result<String> {
    let res = client
        .post(server.url("/api/auth/login"))
        .json(&json!({ "email": email, "password": "long-enough" }))
        .send()
        .await?;
    let (status, body) = common::json_body(res).await?;
    assert_eq!(status, StatusCode::OK, "login: {body}");
    Ok(body["data"]["token"].as_str().expect("token").to_string())
}

async fn create_admin(client: &reqwest::Client, server: &common::TestServer, token: &str) -> Result<(String, String)> {
    let email = format!("{}@corp.example", common::unique("local-admin"));
    let res = client
        .post(server.url("/api/users"))
        .bearer_auth(token)
        .json(&json!({ "email": email, "password": "long-enough", "firstName": "Grace", "role": "ADMIN" }))
        .send()
        .await?;
    let (status, body) = common::json_body(res).await?;
    assert_eq!(status, StatusCode::CREATED, "create user: {body}");
    Ok((body["data"]["id"].as_str().expect("user id").to_string(), email))
}

#[tokio::test]
async fn deleted_admin_loses_access_with_a_live_token() -> Result<()> {
    if !common::database_configured() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = server().await?;
    let client = reqwest::Client::new();
    let owner = common::admin_token();
    let (id, email) = create_admin(&client, server, &owner).await?;
    let token = sign_in(&client, server, &email).await?;

    let res = client.get(server.url("/api/users")).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .delete(server.url(&format!("/api/users/{id}")))
        .bearer_auth(&owner)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(server.url("/api/users")).bearer_auth(&token).send().await?;
    let (status, body) = common::json_body(res).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Account disabled");
    Ok(())
}

#[tokio::test]
async fn demoted_admin_is_held_to_the_new_role() -> Result<()> {
    if !common::database_configured() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = server().await?;
    let client = reqwest::Client::new();
    let owner = common::admin_token();
    let (id, email) = create_admin(&client, server, &owner).await?;
    let token = sign_in(&client, server, &email).await?;

    let res = client
        .put(server.url(&format!("/api/users/{id}")))
        .bearer_auth(&owner)
        .json(&json!({ "role": "USER" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(server.url("/api/users")).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client.get(server.url("/api/articles")).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn tokens_of_unknown_users_are_invalid() -> Result<()> {
    if !common::database_configured() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(server.url("/api/articles"))
        .bearer_auth(common::local_token("ADMIN"))
        .send()
        .await?;
    let (status, body) = common::json_body(res).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");
    Ok(())
}
