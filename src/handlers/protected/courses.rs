use axum::extract::Path;
use axum::{Extension, Json};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::course::{Course, CreateCourse, UpdateCourse};
use crate::database::models::user::{ROLE_ADMIN, ROLE_PUBLISHER};
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::stats;

/// POST /api/v1/bootcamps/:id/courses
pub async fn course_create(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<CreateCourse>,
) -> ApiResult<Course> {
    auth.require_role(&[ROLE_PUBLISHER, ROLE_ADMIN])?;
    let bootcamp_id = parse_id(&id)?;
    let pool = DatabaseManager::pool().await?;

    let owner_id =
        sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM \"bootcamps\" WHERE id = $1")
            .bind(bootcamp_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| {
                ApiError::not_found(format!("No bootcamp with the id of {}", bootcamp_id))
            })?;

    auth.require_owner(owner_id, "bootcamp")?;
    payload.validate()?;

    let course = sqlx::query_as::<_, Course>(
        "INSERT INTO \"courses\" (\
           title, description, weeks, tuition, minimum_skill, scholarship_available, \
           bootcamp_id, user_id\
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
    )
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(&payload.weeks)
    .bind(payload.tuition)
    .bind(&payload.minimum_skill)
    .bind(payload.scholarship_available)
    .bind(bootcamp_id)
    .bind(auth.user_id)
    .fetch_one(pool)
    .await?;

    stats::refresh_average_cost(pool, bootcamp_id).await;

    Ok(ApiResponse::success(course))
}

/// PUT /api/v1/courses/:id
pub async fn course_update(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCourse>,
) -> ApiResult<Course> {
    let id = parse_id(&id)?;
    let pool = DatabaseManager::pool().await?;

    let existing = sqlx::query_as::<_, Course>("SELECT * FROM \"courses\" WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No course with the id of {}", id)))?;

    auth.require_owner(existing.user_id, "course")?;
    payload.validate()?;

    let course = sqlx::query_as::<_, Course>(
        "UPDATE \"courses\" SET \
           title = COALESCE($2, title), \
           description = COALESCE($3, description), \
           weeks = COALESCE($4, weeks), \
           tuition = COALESCE($5, tuition), \
           minimum_skill = COALESCE($6, minimum_skill), \
           scholarship_available = COALESCE($7, scholarship_available) \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(payload.title)
    .bind(payload.description)
    .bind(payload.weeks)
    .bind(payload.tuition)
    .bind(payload.minimum_skill)
    .bind(payload.scholarship_available)
    .fetch_one(pool)
    .await?;

    stats::refresh_average_cost(pool, course.bootcamp_id).await;

    Ok(ApiResponse::success(course))
}

/// DELETE /api/v1/courses/:id
pub async fn course_delete(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let pool = DatabaseManager::pool().await?;

    let existing = sqlx::query_as::<_, Course>("SELECT * FROM \"courses\" WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No course with the id of {}", id)))?;

    auth.require_owner(existing.user_id, "course")?;

    sqlx::query("DELETE FROM \"courses\" WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    stats::refresh_average_cost(pool, existing.bootcamp_id).await;

    Ok(Json(json!({ "success": true, "data": {} })))
}
