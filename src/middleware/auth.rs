use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use uuid::Uuid;

use crate::auth::Claims;
use crate::config;
use crate::error::ApiError;

/// Authenticated user context extracted from the bearer token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
        }
    }
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == crate::database::models::user::ROLE_ADMIN
    }

    /// Role gate for route handlers; admin passes everywhere the listed
    /// roles do.
    pub fn require_role(&self, roles: &[&str]) -> Result<(), ApiError> {
        if roles.contains(&self.role.as_str()) {
            return Ok(());
        }
        Err(ApiError::forbidden(format!(
            "User role {} is not authorized to access this route",
            self.role
        )))
    }

    /// Ownership gate: admins may touch anything, everyone else only their
    /// own records. Failures surface as 401.
    pub fn require_owner(&self, owner_id: Uuid, what: &str) -> Result<(), ApiError> {
        if self.is_admin() || self.user_id == owner_id {
            return Ok(());
        }
        Err(ApiError::unauthorized(format!(
            "User {} is not authorized to modify this {}",
            self.user_id, what
        )))
    }
}

/// Bearer-token middleware that validates tokens and injects the user context
pub async fn auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, impl IntoResponse> {
    let token = extract_bearer_token(&headers).map_err(unauthorized_response)?;

    let claims = validate_jwt(&token).map_err(unauthorized_response)?;

    let auth_user = AuthUser::from(claims);
    request.extensions_mut().insert(auth_user);

    Ok::<Response, (StatusCode, Json<serde_json::Value>)>(next.run(request).await)
}

fn unauthorized_response(msg: String) -> (StatusCode, Json<serde_json::Value>) {
    let api_error = ApiError::unauthorized(msg);
    (
        StatusCode::from_u16(api_error.status_code()).unwrap_or(StatusCode::UNAUTHORIZED),
        Json(api_error.to_json()),
    )
}

/// Extract the token from the Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))
        .ok_or_else(|| "Not authorized to access this route".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Not authorized to access this route".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

/// Validate the token and extract claims
fn validate_jwt(token: &str) -> Result<Claims, String> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err("JWT secret not configured".to_string());
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|_| "Not authorized to access this route".to_string())?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::user::{ROLE_ADMIN, ROLE_PUBLISHER, ROLE_USER};

    fn auth_user(role: &str) -> AuthUser {
        AuthUser { user_id: Uuid::new_v4(), role: role.to_string() }
    }

    #[test]
    fn role_gate_admits_listed_roles() {
        assert!(auth_user(ROLE_PUBLISHER).require_role(&[ROLE_PUBLISHER, ROLE_ADMIN]).is_ok());
        let err = auth_user(ROLE_USER).require_role(&[ROLE_PUBLISHER, ROLE_ADMIN]).unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn ownership_gate_admits_owner_and_admin() {
        let owner = auth_user(ROLE_PUBLISHER);
        assert!(owner.require_owner(owner.user_id, "bootcamp").is_ok());

        let admin = auth_user(ROLE_ADMIN);
        assert!(admin.require_owner(Uuid::new_v4(), "bootcamp").is_ok());

        let stranger = auth_user(ROLE_PUBLISHER);
        let err = stranger.require_owner(Uuid::new_v4(), "bootcamp").unwrap_err();
        assert_eq!(err.status_code(), 401);
    }
}
