use sqlx::PgPool;
use uuid::Uuid;

/// Recompute `bootcamps.average_cost` from the bootcamp's courses: the mean
/// tuition rounded up to the nearest ten, NULL once the last course is gone.
///
/// Failures are logged and swallowed; aggregate refresh never fails the
/// request that triggered it.
pub async fn refresh_average_cost(pool: &PgPool, bootcamp_id: Uuid) {
    let result = sqlx::query(
        "UPDATE \"bootcamps\" SET average_cost = (\
           SELECT ceil(avg(tuition) / 10) * 10 FROM \"courses\" WHERE bootcamp_id = $1\
         ) WHERE id = $1",
    )
    .bind(bootcamp_id)
    .execute(pool)
    .await;

    if let Err(e) = result {
        tracing::error!(bootcamp_id = %bootcamp_id, "average_cost refresh failed: {}", e);
    }
}

/// Recompute `bootcamps.average_rating` from the bootcamp's reviews.
pub async fn refresh_average_rating(pool: &PgPool, bootcamp_id: Uuid) {
    let result = sqlx::query(
        "UPDATE \"bootcamps\" SET average_rating = (\
           SELECT avg(rating) FROM \"reviews\" WHERE bootcamp_id = $1\
         ) WHERE id = $1",
    )
    .bind(bootcamp_id)
    .execute(pool)
    .await;

    if let Err(e) = result {
        tracing::error!(bootcamp_id = %bootcamp_id, "average_rating refresh failed: {}", e);
    }
}
