use axum::extract::{Path, RawQuery};
use axum::{Extension, Json};
use serde_json::{json, Value};

use crate::database::manager::DatabaseManager;
use crate::database::models::user::{AdminUpsertUser, User, ROLE_ADMIN, ROLE_USER, USERS};
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::listing::{self, ListEnvelope};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::password;

/// GET /api/v1/users - admin-only listing over the users collection
pub async fn users_list(
    Extension(auth): Extension<AuthUser>,
    RawQuery(raw): RawQuery,
) -> Result<Json<ListEnvelope>, ApiError> {
    auth.require_role(&[ROLE_ADMIN])?;
    let pool = DatabaseManager::pool().await?;
    let envelope = listing::materialize(pool, &USERS, raw.as_deref().unwrap_or(""), None).await?;
    Ok(Json(envelope))
}

/// GET /api/v1/users/:id
pub async fn user_get(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<User> {
    auth.require_role(&[ROLE_ADMIN])?;
    let id = parse_id(&id)?;
    let pool = DatabaseManager::pool().await?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM \"users\" WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User not found with id of {}", id)))?;

    Ok(ApiResponse::success(user))
}

/// POST /api/v1/users
pub async fn user_create(
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<AdminUpsertUser>,
) -> ApiResult<User> {
    auth.require_role(&[ROLE_ADMIN])?;
    payload.validate()?;

    let Some(plaintext) = &payload.password else {
        return Err(ApiError::validation_error(
            "Invalid user data",
            Some(std::collections::HashMap::from([(
                "password".to_string(),
                "Please add a password".to_string(),
            )])),
        ));
    };

    let pool = DatabaseManager::pool().await?;
    let password_hash = password::hash_password(plaintext)?;
    let role = payload.role.as_deref().unwrap_or(ROLE_USER);

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

    Ok(ApiResponse::created(user))
}

/// PUT /api/v1/users/:id
pub async fn user_update(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<AdminUpsertUser>,
) -> ApiResult<User> {
    auth.require_role(&[ROLE_ADMIN])?;
    let id = parse_id(&id)?;
    payload.validate()?;

    let pool = DatabaseManager::pool().await?;
    let password_hash = match &payload.password {
        Some(plaintext) => Some(password::hash_password(plaintext)?),
        None => None,
    };

    let user = sqlx::query_as::<_, User>(
        "UPDATE \"users\" SET \
           name = $2, \
           email = $3, \
           role = COALESCE($4, role), \
           password_hash = COALESCE($5, password_hash) \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(payload.role)
    .bind(password_hash)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::RowNotFound => ApiError::not_found(format!("User not found with id of {}", id)),
        other => other.into(),
    })?;

    Ok(ApiResponse::success(user))
}

/// DELETE /api/v1/users/:id
pub async fn user_delete(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    auth.require_role(&[ROLE_ADMIN])?;
    let id = parse_id(&id)?;
    let pool = DatabaseManager::pool().await?;

    sqlx::query("DELETE FROM \"users\" WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(Json(json!({ "success": true, "data": {} })))
}
