use axum::extract::Path;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{generate_jwt, Claims};
use crate::database::manager::DatabaseManager;
use crate::database::models::user::{RegisterUser, User, ROLE_USER};
use crate::error::ApiError;
use crate::services::mailer::mailer;
use crate::services::password;

/// Issue a fresh token for the user; the response shape all credential
/// endpoints share.
pub(crate) fn token_response(user: &User) -> Result<Json<Value>, ApiError> {
    let claims = Claims::new(user.id, user.role.clone());
    let token = generate_jwt(claims)?;
    Ok(Json(json!({ "success": true, "token": token })))
}

/// POST /api/v1/auth/register
pub async fn register(Json(payload): Json<RegisterUser>) -> Result<Json<Value>, ApiError> {
    payload.validate()?;
    let pool = DatabaseManager::pool().await?;

    let password_hash = password::hash_password(&payload.password)?;
    let role = payload.role.as_deref().unwrap_or(ROLE_USER);

    // Duplicate email surfaces as a unique violation -> 409
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO \"users\" (name, email, role, password_hash) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(role)
    .bind(&password_hash)
    .fetch_one(pool)
    .await?;

    token_response(&user)
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /api/v1/auth/login
pub async fn login(Json(payload): Json<LoginPayload>) -> Result<Json<Value>, ApiError> {
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return Err(ApiError::bad_request("Please provide an email and password"));
    };

    let pool = DatabaseManager::pool().await?;
    let user = sqlx::query_as::<_, User>("SELECT * FROM \"users\" WHERE email = $1")
        .bind(&email)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !password::verify_password(&password, &user.password_hash).await {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    token_response(&user)
}

/// GET /api/v1/auth/logout - stateless ack; clients discard the token
pub async fn logout() -> Json<Value> {
    Json(json!({ "success": true, "data": {} }))
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordPayload {
    pub email: String,
}

/// POST /api/v1/auth/forgotpassword
pub async fn forgot_password(
    headers: HeaderMap,
    Json(payload): Json<ForgotPasswordPayload>,
) -> Result<Json<Value>, ApiError> {
    let host = headers
        .get(axum::http::header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost")
        .to_string();
    let pool = DatabaseManager::pool().await?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM \"users\" WHERE email = $1")
        .bind(&payload.email)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("There is no user with that email"))?;

    let reset_token = password::generate_reset_token();
    let expire =
        Utc::now() + Duration::minutes(crate::config::config().security.reset_token_expiry_minutes);

    sqlx::query(
        "UPDATE \"users\" SET reset_password_token = $2, reset_password_expire = $3 WHERE id = $1",
    )
    .bind(user.id)
    .bind(&reset_token.digest)
    .bind(expire)
    .execute(pool)
    .await?;

    let reset_url = format!(
        "http://{}/api/v1/auth/resetpassword/{}",
        host, reset_token.plaintext
    );
    let message = format!(
        "You are receiving this email because you (or someone else) has requested the reset of a \
         password. Please make a PUT request to:\n\n{}",
        reset_url
    );

    if let Err(e) = mailer().send(&user.email, "Password reset token", &message).await {
        tracing::error!("Reset mail failed: {}", e);
        // Roll the token back so the unusable link can not linger
        sqlx::query(
            "UPDATE \"users\" SET reset_password_token = NULL, reset_password_expire = NULL \
             WHERE id = $1",
        )
        .bind(user.id)
        .execute(pool)
        .await?;
        return Err(ApiError::internal_server_error("Email could not be sent"));
    }

    Ok(Json(json!({ "success": true, "data": "Email sent" })))
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordPayload {
    pub password: String,
}

/// PUT /api/v1/auth/resetpassword/:resettoken
pub async fn reset_password(
    Path(resettoken): Path<String>,
    Json(payload): Json<ResetPasswordPayload>,
) -> Result<Json<Value>, ApiError> {
    if payload.password.len() < 6 {
        return Err(ApiError::bad_request("Password must be at least 6 characters"));
    }

    let digest = password::digest_reset_token(&resettoken);
    let pool = DatabaseManager::pool().await?;

    let user = sqlx::query_as::<_, User>(
        "SELECT * FROM \"users\" \
         WHERE reset_password_token = $1 AND reset_password_expire > now()",
    )
    .bind(&digest)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::bad_request("Invalid token"))?;

    let password_hash = password::hash_password(&payload.password)?;
    let user = sqlx::query_as::<_, User>(
        "UPDATE \"users\" SET password_hash = $2, reset_password_token = NULL, \
         reset_password_expire = NULL WHERE id = $1 RETURNING *",
    )
    .bind(user.id)
    .bind(&password_hash)
    .fetch_one(pool)
    .await?;

    token_response(&user)
}
