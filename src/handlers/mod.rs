// Two access tiers, matching the router layout in main.rs:
// public (no auth) and protected (bearer token required).
pub mod protected;
pub mod public;

use uuid::Uuid;

use crate::error::ApiError;

/// Path ids arrive as text; anything that is not a UUID can not name a
/// stored record, so it reads as a missing resource rather than a bad
/// request.
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found("Resource not found"))
}
