//! Account endpoints: signup and profile

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::middleware::RequireUser;
use crate::api::password_reset;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, ValidatedJson};
use crate::domain::user::User;
use crate::infrastructure::user::SignupRequest;

/// Routes mounted under `/user`
pub fn create_user_router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/profile", get(profile))
        .route("/reset_password", post(password_reset::request_reset))
        .route(
            "/reset_password_confirm",
            post(password_reset::confirm_reset),
        )
}

/// Signup form: the password is entered twice
#[derive(Debug, Deserialize, Validate)]
pub struct SignupForm {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password1: String,
    #[validate(length(min = 1, message = "Password confirmation is required"))]
    pub password2: String,
}

/// Public view of a user; the password hash never leaves the server
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().as_str().to_string(),
            username: user.username().to_string(),
            email: user.email().to_string(),
            created_at: user.created_at().to_rfc3339(),
            last_login_at: user.last_login_at().map(|t| t.to_rfc3339()),
        }
    }
}

/// POST /user/signup
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(form): ValidatedJson<SignupForm>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state
        .user_service
        .signup(SignupRequest {
            username: form.username,
            email: form.email,
            password: form.password1,
            password_confirmation: form.password2,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// GET /user/profile
pub async fn profile(RequireUser(user): RequireUser) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}
