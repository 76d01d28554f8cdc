use axum::extract::Path;
use axum::{Extension, Json};
use serde_json::{json, Value};

use crate::database::manager::DatabaseManager;
use crate::database::models::review::{CreateReview, Review, UpdateReview};
use crate::database::models::user::{ROLE_ADMIN, ROLE_USER};
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::stats;

/// POST /api/v1/bootcamps/:id/reviews
pub async fn review_create(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<CreateReview>,
) -> ApiResult<Review> {
    auth.require_role(&[ROLE_USER, ROLE_ADMIN])?;
    let bootcamp_id = parse_id(&id)?;
    let pool = DatabaseManager::pool().await?;

    let exists = sqlx::query_scalar::<_, i64>("SELECT count(*) FROM \"bootcamps\" WHERE id = $1")
        .bind(bootcamp_id)
        .fetch_one(pool)
        .await?;
    if exists == 0 {
        return Err(ApiError::not_found(format!(
            "No bootcamp with the id of {}",
            bootcamp_id
        )));
    }

    payload.validate()?;

    // One review per user per bootcamp; the unique index turns a second
    // submission into a 409
    let review = sqlx::query_as::<_, Review>(
        "INSERT INTO \"reviews\" (title, text, rating, bootcamp_id, user_id) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(&payload.title)
    .bind(&payload.text)
    .bind(payload.rating)
    .bind(bootcamp_id)
    .bind(auth.user_id)
    .fetch_one(pool)
    .await?;

    stats::refresh_average_rating(pool, bootcamp_id).await;

    Ok(ApiResponse::created(review))
}

/// PUT /api/v1/reviews/:id
pub async fn review_update(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateReview>,
) -> ApiResult<Review> {
    let id = parse_id(&id)?;
    let pool = DatabaseManager::pool().await?;

    let existing = sqlx::query_as::<_, Review>("SELECT * FROM \"reviews\" WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No review found with the id of {}", id)))?;

    auth.require_owner(existing.user_id, "review")?;
    payload.validate()?;

    let review = sqlx::query_as::<_, Review>(
        "UPDATE \"reviews\" SET \
           title = COALESCE($2, title), \
           text = COALESCE($3, text), \
           rating = COALESCE($4, rating) \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(payload.title)
    .bind(payload.text)
    .bind(payload.rating)
    .fetch_one(pool)
    .await?;

    stats::refresh_average_rating(pool, review.bootcamp_id).await;

    Ok(ApiResponse::success(review))
}

/// DELETE /api/v1/reviews/:id
pub async fn review_delete(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let pool = DatabaseManager::pool().await?;

    let existing = sqlx::query_as::<_, Review>("SELECT * FROM \"reviews\" WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No review found with the id of {}", id)))?;

    auth.require_owner(existing.user_id, "review")?;

    sqlx::query("DELETE FROM \"reviews\" WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    stats::refresh_average_rating(pool, existing.bootcamp_id).await;

    Ok(Json(json!({ "success": true, "data": {} })))
}
