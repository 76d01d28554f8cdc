use axum::extract::Path;
use axum::{Extension, Json};
use serde_json::{json, Value};

use crate::database::manager::DatabaseManager;
use crate::database::models::bootcamp::{slugify, Bootcamp, CreateBootcamp, UpdateBootcamp};
use crate::database::models::user::{ROLE_ADMIN, ROLE_PUBLISHER};
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::geocoder::{Geocoder, Location};

/// Geocoding runs best-effort: an unreachable resolver leaves the location
/// columns empty instead of failing the write.
async fn resolve_location(address: &str) -> Option<Location> {
    match Geocoder::from_config().geocode(address).await {
        Ok(location) => Some(location),
        Err(e) => {
            tracing::warn!("Geocoding failed for address: {}", e);
            None
        }
    }
}

/// POST /api/v1/bootcamps
pub async fn bootcamp_create(
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateBootcamp>,
) -> ApiResult<Bootcamp> {
    auth.require_role(&[ROLE_PUBLISHER, ROLE_ADMIN])?;
    payload.validate()?;
    let pool = DatabaseManager::pool().await?;

    // Non-admin publishers may own at most one bootcamp
    if !auth.is_admin() {
        let published = sqlx::query_scalar::<_, i64>(
            "SELECT count(*) FROM \"bootcamps\" WHERE user_id = $1",
        )
        .bind(auth.user_id)
        .fetch_one(pool)
        .await?;
        if published > 0 {
            return Err(ApiError::bad_request(format!(
                "The user with ID {} has already published a bootcamp",
                auth.user_id
            )));
        }
    }

    let slug = slugify(&payload.name);
    let location = resolve_location(&payload.address).await;

    let bootcamp = sqlx::query_as::<_, Bootcamp>(
        "INSERT INTO \"bootcamps\" (\
           name, slug, description, website, phone, email, address, \
           formatted_address, street, city, state, zipcode, country, lat, lng, \
           careers, housing, job_assistance, job_guarantee, accept_gi, user_id\
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, \
           $16, $17, $18, $19, $20, $21) RETURNING *",
    )
    .bind(&payload.name)
    .bind(&slug)
    .bind(&payload.description)
    .bind(&payload.website)
    .bind(&payload.phone)
    .bind(&payload.email)
    .bind(&payload.address)
    .bind(location.as_ref().and_then(|l| l.formatted_address.clone()))
    .bind(location.as_ref().and_then(|l| l.street.clone()))
    .bind(location.as_ref().and_then(|l| l.city.clone()))
    .bind(location.as_ref().and_then(|l| l.state.clone()))
    .bind(location.as_ref().and_then(|l| l.zipcode.clone()))
    .bind(location.as_ref().and_then(|l| l.country.clone()))
    .bind(location.as_ref().map(|l| l.lat))
    .bind(location.as_ref().map(|l| l.lng))
    .bind(&payload.careers)
    .bind(payload.housing)
    .bind(payload.job_assistance)
    .bind(payload.job_guarantee)
    .bind(payload.accept_gi)
    .bind(auth.user_id)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::created(bootcamp))
}

/// PUT /api/v1/bootcamps/:id
pub async fn bootcamp_update(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateBootcamp>,
) -> ApiResult<Bootcamp> {
    let id = parse_id(&id)?;
    let pool = DatabaseManager::pool().await?;

    let existing = sqlx::query_as::<_, Bootcamp>("SELECT * FROM \"bootcamps\" WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Bootcamp not found with id of {}", id)))?;

    auth.require_owner(existing.user_id, "bootcamp")?;
    payload.validate()?;

    let slug = payload.name.as_deref().map(slugify);
    let location = match &payload.address {
        Some(address) => resolve_location(address).await,
        None => None,
    };

    let bootcamp = sqlx::query_as::<_, Bootcamp>(
        "UPDATE \"bootcamps\" SET \
           name = COALESCE($2, name), \
           slug = COALESCE($3, slug), \
           description = COALESCE($4, description), \
           website = COALESCE($5, website), \
           phone = COALESCE($6, phone), \
           email = COALESCE($7, email), \
           address = COALESCE($8, address), \
           formatted_address = COALESCE($9, formatted_address), \
           street = COALESCE($10, street), \
           city = COALESCE($11, city), \
           state = COALESCE($12, state), \
           zipcode = COALESCE($13, zipcode), \
           country = COALESCE($14, country), \
           lat = COALESCE($15, lat), \
           lng = COALESCE($16, lng), \
           careers = COALESCE($17, careers), \
           housing = COALESCE($18, housing), \
           job_assistance = COALESCE($19, job_assistance), \
           job_guarantee = COALESCE($20, job_guarantee), \
           accept_gi = COALESCE($21, accept_gi) \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(payload.name)
    .bind(slug)
    .bind(payload.description)
    .bind(payload.website)
    .bind(payload.phone)
    .bind(payload.email)
    .bind(payload.address)
    .bind(location.as_ref().and_then(|l| l.formatted_address.clone()))
    .bind(location.as_ref().and_then(|l| l.street.clone()))
    .bind(location.as_ref().and_then(|l| l.city.clone()))
    .bind(location.as_ref().and_then(|l| l.state.clone()))
    .bind(location.as_ref().and_then(|l| l.zipcode.clone()))
    .bind(location.as_ref().and_then(|l| l.country.clone()))
    .bind(location.as_ref().map(|l| l.lat))
    .bind(location.as_ref().map(|l| l.lng))
    .bind(payload.careers)
    .bind(payload.housing)
    .bind(payload.job_assistance)
    .bind(payload.job_guarantee)
    .bind(payload.accept_gi)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success(bootcamp))
}

/// DELETE /api/v1/bootcamps/:id - courses and reviews go with it
pub async fn bootcamp_delete(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let pool = DatabaseManager::pool().await?;

    let existing = sqlx::query_as::<_, Bootcamp>("SELECT * FROM \"bootcamps\" WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Bootcamp not found with id of {}", id)))?;

    auth.require_owner(existing.user_id, "bootcamp")?;

    tracing::info!(bootcamp_id = %id, "deleting bootcamp with its courses and reviews");
    sqlx::query("DELETE FROM \"bootcamps\" WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(Json(json!({ "success": true, "data": {} })))
}
