use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::Value;

use crate::database::manager::DatabaseManager;
use crate::database::models::user::{UpdateUserDetails, User};
use crate::error::ApiError;
use crate::handlers::public::auth::token_response;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::password;

/// GET /api/v1/auth/me
pub async fn me(Extension(auth): Extension<AuthUser>) -> ApiResult<User> {
    let pool = DatabaseManager::pool().await?;
    let user = sqlx::query_as::<_, User>("SELECT * FROM \"users\" WHERE id = $1")
        .bind(auth.user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Not authorized to access this route"))?;

    Ok(ApiResponse::success(user))
}

/// PUT /api/v1/auth/updatedetails
pub async fn update_details(
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<UpdateUserDetails>,
) -> ApiResult<User> {
    payload.validate()?;
    let pool = DatabaseManager::pool().await?;

    let user = sqlx::query_as::<_, User>(
        "UPDATE \"users\" SET name = COALESCE($2, name), email = COALESCE($3, email) \
         WHERE id = $1 RETURNING *",
    )
    .bind(auth.user_id)
    .bind(payload.name)
    .bind(payload.email)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success(user))
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordPayload {
    pub current_password: String,
    pub new_password: String,
}

/// PUT /api/v1/auth/updatepassword
pub async fn update_password(
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<UpdatePasswordPayload>,
) -> Result<Json<Value>, ApiError> {
    if payload.new_password.len() < 6 {
        return Err(ApiError::bad_request("Password must be at least 6 characters"));
    }

    let pool = DatabaseManager::pool().await?;
    let user = sqlx::query_as::<_, User>("SELECT * FROM \"users\" WHERE id = $1")
        .bind(auth.user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Not authorized to access this route"))?;

    if !password::verify_password(&payload.current_password, &user.password_hash).await {
        return Err(ApiError::unauthorized("Password is incorrect"));
    }

    let password_hash = password::hash_password(&payload.new_password)?;
    let user = sqlx::query_as::<_, User>(
        "UPDATE \"users\" SET password_hash = $2 WHERE id = $1 RETURNING *",
    )
    .bind(auth.user_id)
    .bind(&password_hash)
    .fetch_one(pool)
    .await?;

    token_response(&user)
}
