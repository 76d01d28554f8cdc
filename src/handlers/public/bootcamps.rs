use axum::extract::{Path, RawQuery};
use axum::Json;
use serde_json::{json, Value};

use crate::database::manager::DatabaseManager;
use crate::database::models::bootcamp::{Bootcamp, BOOTCAMPS};
use crate::database::models::course::{Course, COURSES};
use crate::database::models::review::Review;
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::listing::{self, Expand, ListEnvelope, Relation};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::geocoder::Geocoder;

/// GET /api/v1/bootcamps - filtered/sorted/paginated listing with the
/// bootcamp's courses inlined
pub async fn bootcamps_list(RawQuery(raw): RawQuery) -> Result<Json<ListEnvelope>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let expand = Expand::relation(Relation::HasMany {
        name: "courses",
        target: &COURSES,
        fk_column: "bootcamp_id",
    });
    let envelope =
        listing::materialize(pool, &BOOTCAMPS, raw.as_deref().unwrap_or(""), Some(expand)).await?;
    Ok(Json(envelope))
}

/// GET /api/v1/bootcamps/:id - single bootcamp
pub async fn bootcamp_get(Path(id): Path<String>) -> ApiResult<Bootcamp> {
    let id = parse_id(&id)?;
    let pool = DatabaseManager::pool().await?;

    let bootcamp = sqlx::query_as::<_, Bootcamp>("SELECT * FROM \"bootcamps\" WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Bootcamp not found with id of {}", id)))?;

    Ok(ApiResponse::success(bootcamp))
}

/// GET /api/v1/bootcamps/radius/:zipcode/:distance - bootcamps within
/// `distance` miles of the zipcode
pub async fn bootcamps_in_radius(
    Path((zipcode, distance)): Path<(String, f64)>,
) -> Result<Json<Value>, ApiError> {
    if !distance.is_finite() || distance < 0.0 {
        return Err(ApiError::bad_request("Distance must be a non-negative number"));
    }

    let location = Geocoder::from_config().geocode(&zipcode).await?;

    // Central angle threshold: distance over the earth's radius in miles
    let radius = distance / 3963.0;

    let pool = DatabaseManager::pool().await?;
    let bootcamps = sqlx::query_as::<_, Bootcamp>(
        "SELECT * FROM \"bootcamps\" WHERE lat IS NOT NULL AND lng IS NOT NULL AND \
         acos(least(1.0, greatest(-1.0, \
           sin(radians($1)) * sin(radians(lat)) + \
           cos(radians($1)) * cos(radians(lat)) * cos(radians(lng) - radians($2))\
         ))) <= $3",
    )
    .bind(location.lat)
    .bind(location.lng)
    .bind(radius)
    .fetch_all(pool)
    .await?;

    Ok(Json(json!({
        "success": true,
        "count": bootcamps.len(),
        "data": bootcamps,
    })))
}

/// GET /api/v1/bootcamps/:id/courses - all courses of one bootcamp
pub async fn bootcamp_courses_list(Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let pool = DatabaseManager::pool().await?;

    let courses = sqlx::query_as::<_, Course>("SELECT * FROM \"courses\" WHERE bootcamp_id = $1")
        .bind(id)
        .fetch_all(pool)
        .await?;

    Ok(Json(json!({
        "success": true,
        "count": courses.len(),
        "data": courses,
    })))
}

/// GET /api/v1/bootcamps/:id/reviews - all reviews of one bootcamp
pub async fn bootcamp_reviews_list(Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let pool = DatabaseManager::pool().await?;

    let reviews = sqlx::query_as::<_, Review>("SELECT * FROM \"reviews\" WHERE bootcamp_id = $1")
        .bind(id)
        .fetch_all(pool)
        .await?;

    Ok(Json(json!({
        "success": true,
        "count": reviews.len(),
        "data": reviews,
    })))
}
