use axum::extract::{Path, RawQuery};
use axum::Json;
use serde_json::Value;
use sqlx::Row;

use crate::database::manager::DatabaseManager;
use crate::database::models::bootcamp::BOOTCAMPS;
use crate::database::models::review::REVIEWS;
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::listing::{self, Expand, ListEnvelope, Relation};
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/v1/reviews - filtered/sorted/paginated listing with the parent
/// bootcamp's name and description inlined
pub async fn reviews_list(RawQuery(raw): RawQuery) -> Result<Json<ListEnvelope>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let expand = Expand::with_select(
        Relation::BelongsTo { name: "bootcamp", target: &BOOTCAMPS, fk_column: "bootcamp_id" },
        &["name", "description"],
    );
    let envelope =
        listing::materialize(pool, &REVIEWS, raw.as_deref().unwrap_or(""), Some(expand)).await?;
    Ok(Json(envelope))
}

/// GET /api/v1/reviews/:id - single review with its bootcamp inlined
pub async fn review_get(Path(id): Path<String>) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    let pool = DatabaseManager::pool().await?;

    let row = sqlx::query(
        "SELECT row_to_json(t) AS row FROM (\
           SELECT v.*, (\
             SELECT row_to_json(b) FROM (\
               SELECT id, name, description FROM \"bootcamps\" WHERE \"bootcamps\".id = v.bootcamp_id\
             ) b\
           ) AS bootcamp FROM \"reviews\" v WHERE v.id = $1\
         ) t",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::not_found(format!("No review found with the id of {}", id)))?;

    let review: Value = row.try_get("row")?;
    Ok(ApiResponse::success(review))
}
