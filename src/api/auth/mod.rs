//! Authentication API endpoints
//!
//! Login issues a signed session token; logout is acknowledged only, since
//! tokens are stateless and discarded by the client.

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::api::user::UserResponse;

/// Routes mounted under `/auth`
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(get_current_user))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
    pub expires_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .user_service
        .authenticate(&request.username, &request.password)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid username or password"))?;

    let issued = state.jwt_service.generate(&user)?;
    info!(user_id = %user.id(), "User logged in");

    Ok(Json(LoginResponse {
        token: issued.token,
        user: UserResponse::from(&user),
        expires_at: issued.expires_at.to_rfc3339(),
    }))
}

/// POST /auth/logout
pub async fn logout(RequireUser(user): RequireUser) -> Json<LogoutResponse> {
    info!(user_id = %user.id(), "User logged out");

    Json(LogoutResponse {
        message: "Logged out successfully".to_string(),
    })
}

/// GET /auth/me
pub async fn get_current_user(RequireUser(user): RequireUser) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}
