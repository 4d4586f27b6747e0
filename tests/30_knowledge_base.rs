mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn category_and_article_lifecycle() -> Result<()> {
    if !common::database_configured() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::admin_token();
    let category_name = common::unique("Printers");

    // Category
    let res = client
        .post(server.url("/api/categories"))
        .bearer_auth(&token)
        .json(&json!({ "name": category_name, "description": "Print queues", "icon": "printer" }))
        .send()
        .await?;
    let (status, body) = common::json_body(res).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "ACTIVE");
    let category_id = body["data"]["id"].as_str().expect("category id").to_string();

    let res = client
        .post(server.url("/api/categories"))
        .bearer_auth(&token)
        .json(&json!({ "name": category_name }))
        .send()
        .await?;
    let (status, body) = common::json_body(res).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "A category with this name already exists.");

    // Article
    let title = common::unique("Clear a stuck print job");
    let res = client
        .post(server.url("/api/articles"))
        .bearer_auth(&token)
        .json(&json!({ "title": title, "content": "<p>Restart the spooler</p>", "categoryId": category_id }))
        .send()
        .await?;
    let (status, body) = common::json_body(res).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "PUBLISHED");
    assert_eq!(body["data"]["category"]["name"], category_name.as_str());
    assert_eq!(body["data"]["author"]["firstName"], "Test");
    let article_id = body["data"]["id"].as_str().expect("article id").to_string();

    // Search is case-insensitive and matches the category name too
    let res = client
        .get(server.url("/api/articles"))
        .query(&[("search", category_name.to_uppercase())])
        .bearer_auth(&token)
        .send()
        .await?;
    let (status, body) = common::json_body(res).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(contains_id(&body["data"], &article_id));

    // Wildcards in the term are literal
    let res = client
        .get(server.url("/api/articles"))
        .query(&[("search", format!("{}%", category_name))])
        .bearer_auth(&token)
        .send()
        .await?;
    let (_, body) = common::json_body(res).await?;
    assert!(!contains_id(&body["data"], &article_id));

    let res = client.get(server.url("/api/categories")).bearer_auth(&token).send().await?;
    let (_, body) = common::json_body(res).await?;
    assert_eq!(article_count(&body["data"], &category_id), Some(1));

    // Partial update leaves content alone
    let res = client
        .put(server.url(&format!("/api/articles/{article_id}")))
        .bearer_auth(&token)
        .json(&json!({ "status": "DRAFT" }))
        .send()
        .await?;
    let (status, body) = common::json_body(res).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "DRAFT");
    assert_eq!(body["data"]["content"], "<p>Restart the spooler</p>");

    // Delete
    let res = client
        .delete(server.url(&format!("/api/articles/{article_id}")))
        .bearer_auth(&token)
        .send()
        .await?;
    let (status, body) = common::json_body(res).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Article deleted");

    let res = client
        .get(server.url(&format!("/api/articles/{article_id}")))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.get(server.url("/api/categories")).bearer_auth(&token).send().await?;
    let (_, body) = common::json_body(res).await?;
    assert_eq!(article_count(&body["data"], &category_id), Some(0));

    let res = client
        .delete(server.url(&format!("/api/categories/{category_id}")))
        .bearer_auth(&token)
        .send()
        .await?;
    let (status, body) = common::json_body(res).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Category deleted");
    Ok(())
}

#[tokio::test]
async fn article_requires_title_and_known_category() -> Result<()> {
    if !common::database_configured() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::admin_token();

    let res = client
        .post(server.url("/api/articles"))
        .bearer_auth(&token)
        .json(&json!({ "content": "no title", "categoryId": uuid::Uuid::new_v4() }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(server.url("/api/articles"))
        .bearer_auth(&token)
        .json(&json!({ "title": "Orphan", "categoryId": uuid::Uuid::new_v4() }))
        .send()
        .await?;
    let (status, body) = common::json_body(res).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"]["categoryId"], "Category not found");
    Ok(())
}

#[tokio::test]
async fn regular_users_read_but_cannot_write() -> Result<()> {
    if !common::database_configured() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::idp_token(&format!("{}@corp.example", common::unique("reader")), "USER");

    let res = client.get(server.url("/api/articles")).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(server.url("/api/categories"))
        .bearer_auth(&token)
        .json(&json!({ "name": "Not allowed" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn rows_of_another_organization_are_not_found() -> Result<()> {
    if !common::database_configured() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::admin_token();
    let category_id = create_category(&client, server, &token, &common::unique("Payroll")).await?;
    let article_id = create_article(&client, server, &token, &category_id, json!({ "title": "Payslips" })).await?;

    let outsider = common::local_token_for(uuid::Uuid::new_v4(), "ADMIN", uuid::Uuid::new_v4());
    for path in [format!("/api/categories/{category_id}"), format!("/api/articles/{article_id}")] {
        let url = server.url(&path);

        let res = client.get(&url).bearer_auth(&outsider).send().await?;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "GET {path}");

        let res = client
            .put(&url)
            .bearer_auth(&outsider)
            .json(&json!({ "name": "Taken over", "title": "Taken over" }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "PUT {path}");

        let res = client.delete(&url).bearer_auth(&outsider).send().await?;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "DELETE {path}");
    }

    // Lists of the other organization do not include them either
    let res = client.get(server.url("/api/articles")).bearer_auth(&outsider).send().await?;
    let (status, body) = common::json_body(res).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(!contains_id(&body["data"], &article_id));

    // Untouched for the owner
    let res = client
        .get(server.url(&format!("/api/articles/{article_id}")))
        .bearer_auth(&token)
        .send()
        .await?;
    let (status, body) = common::json_body(res).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Payslips");
    Ok(())
}

#[tokio::test]
async fn article_list_filters_by_category_and_status() -> Result<()> {
    if !common::database_configured() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::admin_token();
    let vpn = create_category(&client, server, &token, &common::unique("VPN")).await?;
    let email = create_category(&client, server, &token, &common::unique("Email")).await?;

    let draft = create_article(
        &client,
        server,
        &token,
        &vpn,
        json!({ "title": "Split tunnel setup", "status": "DRAFT" }),
    )
    .await?;
    let published = create_article(&client, server, &token, &email, json!({ "title": "Shared mailbox" })).await?;

    let body = list_articles(&client, server, &token, &[("categoryId", vpn.as_str())]).await?;
    assert!(contains_id(&body, &draft));
    assert!(!contains_id(&body, &published));

    let body = list_articles(&client, server, &token, &[("status", "DRAFT")]).await?;
    assert!(contains_id(&body, &draft));
    assert!(!contains_id(&body, &published));

    let body = list_articles(&client, server, &token, &[("categoryId", email.as_str()), ("status", "PUBLISHED")]).await?;
    assert!(contains_id(&body, &published));
    assert!(!contains_id(&body, &draft));

    let body = list_articles(&client, server, &token, &[]).await?;
    assert!(contains_id(&body, &draft));
    assert!(contains_id(&body, &published));
    Ok(())
}

#[tokio::test]
async fn search_matches_title_and_content() -> Result<()> {
    if !common::database_configured() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::admin_token();
    let category = create_category(&client, server, &token, &common::unique("Laptops")).await?;
    let title_word = common::unique("docking");
    let content_word = common::unique("firmware");

    let by_title = create_article(
        &client,
        server,
        &token,
        &category,
        json!({ "title": format!("Fix the {title_word} station"), "content": "<p>Unplug it</p>" }),
    )
    .await?;
    let by_content = create_article(
        &client,
        server,
        &token,
        &category,
        json!({ "title": "Battery drain", "content": format!("<p>Update the {content_word}</p>") }),
    )
    .await?;

    let body = list_articles(&client, server, &token, &[("search", title_word.to_uppercase().as_str())]).await?;
    assert!(contains_id(&body, &by_title));
    assert!(!contains_id(&body, &by_content));

    let body = list_articles(&client, server, &token, &[("search", content_word.as_str())]).await?;
    assert!(contains_id(&body, &by_content));
    assert!(!contains_id(&body, &by_title));
    Ok(())
}

#[tokio::test]
async fn articles_larger_than_two_megabytes_are_accepted() -> Result<()> {
    if !common::database_configured() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::admin_token();
    let category = create_category(&client, server, &token, &common::unique("Manuals")).await?;

    // Development allows 10MB bodies
    let content = format!("<p>{}</p>", "a".repeat(3 * 1024 * 1024));
    let res = client
        .post(server.url("/api/articles"))
        .bearer_auth(&token)
        .json(&json!({ "title": "Scanned manual", "content": content, "categoryId": category }))
        .send()
        .await?;
    let (status, body) = common::json_body(res).await?;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", body["message"]);
    Ok(())
}

#[tokio::test]
async fn deleted_category_names_can_be_reused() -> Result<()> {
    if !common::database_configured() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::admin_token();
    let name = common::unique("Telephony");

    let first = create_category(&client, server, &token, &name).await?;
    let res = client
        .delete(server.url(&format!("/api/categories/{first}")))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let second = create_category(&client, server, &token, &name).await?;
    assert_ne!(first, second);

    let res = client
        .post(server.url("/api/categories"))
        .bearer_auth(&token)
        .json(&json!({ "name": name }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    Ok(())
}

async fn create_category(
    client: &reqwest::Client,
    server: &common::TestServer,
    token: &str,
    name: &str,
) -> Result<String> {
    let res = client
        .post(server.url("/api/categories"))
        .bearer_auth(token)
        .json(&json!({ "name": name }))
        .send()
        .await?;
    let (status, body) = common::json_body(res).await?;
    assert_eq!(status, StatusCode::CREATED, "category {name}: {body}");
    Ok(body["data"]["id"].as_str().expect("category id").to_string())
}

async fn create_article(
    client: &reqwest::Client,
    server: &common::TestServer,
    token: &str,
    category_id: &str,
    mut fields: Value,
) -> Result<String> {
    fields["categoryId"] = json!(category_id);
    let res = client
        .post(server.url("/api/articles"))
        .bearer_auth(token)
        .json(&fields)
        .send()
        .await?;
    let (status, body) = common::json_body(res).await?;
    assert_eq!(status, StatusCode::CREATED, "article: {body}");
    Ok(body["data"]["id"].as_str().expect("article id").to_string())
}

async fn list_articles(
    client: &reqwest::Client,
    server: &common::TestServer,
    token: &str,
    query: &[(&str, &str)],
) -> Result<Value> {
    let res = client
        .get(server.url("/api/articles"))
        .query(query)
        .bearer_auth(token)
        .send()
        .await?;
    let (status, body) = common::json_body(res).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(body["data"].clone())
}

fn contains_id(list: &Value, id: &str) -> bool {
    list.as_array()
        .map(|items| items.iter().any(|item| item["id"] == id))
        .unwrap_or(false)
}

fn article_count(categories: &Value, id: &str) -> Option<i64> {
    categories
        .as_array()?
        .iter()
        .find(|c| c["id"] == id)
        .and_then(|c| c["articleCount"].as_i64())
}
