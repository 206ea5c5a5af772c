//! Session authentication extractor using JWT bearer tokens

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::User;

/// Extractor that requires `Authorization: Bearer <jwt>` for a still-existing user
#[derive(Debug, Clone)]
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;

        let claims = state.jwt_service.validate(&token).map_err(|e| {
            debug!(error = %e, "Rejected session token");
            ApiError::unauthorized("Invalid or expired session token")
        })?;

        let user = state
            .user_service
            .get(claims.user_id())
            .await?
            .ok_or_else(|| ApiError::unauthorized("User not found"))?;

        Ok(RequireUser(user))
    }
}

/// Extract the bearer token from the Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Err(ApiError::unauthorized(
            "Authentication required. Provide 'Authorization: Bearer <token>'",
        ));
    };

    let value = value
        .to_str()
        .map_err(|_| ApiError::bad_request("Invalid Authorization header encoding"))?;

    match value.strip_prefix("Bearer ").map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(ApiError::unauthorized("Unsupported authorization scheme")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        let token = extract_bearer_token(&headers_with("Bearer eyJhbGciOiJIUzI1NiJ9.test"));
        assert_eq!(token.unwrap(), "eyJhbGciOiJIUzI1NiJ9.test");
    }

    #[test]
    fn test_trimmed_token() {
        let token = extract_bearer_token(&headers_with("Bearer   padded-token   "));
        assert_eq!(token.unwrap(), "padded-token");
    }

    #[test]
    fn test_missing_token() {
        let err = extract_bearer_token(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_other_scheme_rejected() {
        let err = extract_bearer_token(&headers_with("Basic dXNlcjpwYXNz")).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);

        let empty = extract_bearer_token(&headers_with("Bearer   ")).unwrap_err();
        assert_eq!(empty.status, StatusCode::UNAUTHORIZED);
    }
}
