//! Password reset endpoints
//!
//! `POST /user/reset_password` mails a single-use link and
//! `POST /user/reset_password_confirm` redeems the token from that link.

use axum::{extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, ValidatedJson};

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordForm {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordConfirmForm {
    #[serde(default)]
    pub token: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password1: String,
    #[validate(length(min = 1, message = "Password confirmation is required"))]
    pub password2: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /user/reset_password
pub async fn request_reset(
    State(state): State<AppState>,
    ValidatedJson(form): ValidatedJson<ResetPasswordForm>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    state
        .password_reset_service
        .request_reset(&form.email)
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: "Password reset instructions have been sent".to_string(),
        }),
    ))
}

/// POST /user/reset_password_confirm
pub async fn confirm_reset(
    State(state): State<AppState>,
    ValidatedJson(form): ValidatedJson<ResetPasswordConfirmForm>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .password_reset_service
        .redeem(&form.token, &form.password1, &form.password2)
        .await?;

    Ok(Json(MessageResponse {
        message: "Your password has been reset".to_string(),
    }))
}
