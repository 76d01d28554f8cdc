mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

// Register/login flow and the role gates in front of protected routes.

#[tokio::test]
async fn register_login_me_round_trip() -> Result<()> {
    if !common::database_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let email = common::unique_email("alice");

    let res = client
        .post(format!("{}/api/v1/auth/register", server.base_url))
        .json(&json!({ "name": "Alice", "email": email, "password": "secret123" }))
        .send()
        .await?;
    let status = res.status();
    let payload = res.json::<serde_json::Value>().await?;
    assert_eq!(status, StatusCode::OK, "register failed: {}", payload);
    assert!(payload["success"].as_bool().unwrap_or(false));
    let token = payload["token"].as_str().expect("token missing").to_string();

    // Same credentials log in
    let res = client
        .post(format!("{}/api/v1/auth/login", server.base_url))
        .json(&json!({ "email": email, "password": "secret123" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Wrong password does not
    let res = client
        .post(format!("{}/api/v1/auth/login", server.base_url))
        .json(&json!({ "email": email, "password": "wrong-password" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Token reaches the protected tier
    let res = client
        .get(format!("{}/api/v1/auth/me", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let payload = res.json::<serde_json::Value>().await?;
    assert_eq!(payload["data"]["email"].as_str(), Some(email.as_str()));
    // Credential columns never serialize
    assert!(payload["data"].get("password_hash").is_none());

    Ok(())
}

#[tokio::test]
async fn protected_routes_reject_missing_token() -> Result<()> {
    if !common::database_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/v1/auth/me", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(format!("{}/api/v1/bootcamps", server.base_url))
        .json(&json!({ "name": "Nope" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn plain_users_cannot_publish_bootcamps() -> Result<()> {
    if !common::database_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let email = common::unique_email("reader");

    let res = client
        .post(format!("{}/api/v1/auth/register", server.base_url))
        .json(&json!({ "name": "Reader", "email": email, "password": "secret123" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let token = res.json::<serde_json::Value>().await?["token"]
        .as_str()
        .expect("token missing")
        .to_string();

    let res = client
        .post(format!("{}/api/v1/bootcamps", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Reader Camp",
            "description": "Should not exist",
            "address": "1 Main St",
            "careers": ["Business"],
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Admin-only listing is out of reach too
    let res = client
        .get(format!("{}/api/v1/users", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn registration_validates_payload() -> Result<()> {
    if !common::database_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/v1/auth/register", server.base_url))
        .json(&json!({ "name": "", "email": "not-an-email", "password": "123" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let payload = res.json::<serde_json::Value>().await?;
    assert_eq!(payload["code"].as_str(), Some("VALIDATION_ERROR"));
    assert!(payload["field_errors"].get("email").is_some());

    Ok(())
}
