mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_endpoint_reports_database_state() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = reqwest::get(server.url("/api/health")).await?;
    let (status, body) = common::json_body(res).await?;

    match status {
        StatusCode::OK => assert_eq!(body["database"], "connected"),
        StatusCode::SERVICE_UNAVAILABLE => assert_eq!(body["database"], "disconnected"),
        other => panic!("unexpected status: {other}"),
    }
    assert!(body["timestamp"].is_string());
    Ok(())
}

#[tokio::test]
async fn unknown_api_route_is_json_404() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = reqwest::get(server.url("/api/nothing-here")).await?;
    let (status, body) = common::json_body(res).await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], true);
    Ok(())
}
