//! Password reset workflow: token issuance, reset mail and redemption

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use crate::domain::mail::{EmailMessage, Mailer};
use crate::domain::password_reset::{
    PasswordResetError, PasswordResetToken, PasswordResetTokenRepository, TokenDigest,
};
use crate::domain::user::{validate_password_confirmation, User, UserRepository};
use crate::infrastructure::user::PasswordHasher;

use super::generator::ResetTokenGenerator;

const RESET_MAIL_SUBJECT: &str = "Password reset request";

/// Tunables for the reset workflow
#[derive(Debug, Clone)]
pub struct PasswordResetSettings {
    /// How long an issued token stays redeemable
    pub token_ttl: Duration,
    /// Link base the raw token is appended to as `?token=`
    pub reset_link_base: String,
    /// Answer unknown emails like known ones instead of failing with EmailNotFound
    pub conceal_unknown_email: bool,
    /// Drop every other outstanding token of the user after a successful reset
    pub invalidate_sibling_tokens: bool,
}

impl Default for PasswordResetSettings {
    fn default() -> Self {
        Self {
            token_ttl: Duration::minutes(60),
            reset_link_base: "http://localhost:8080/user/reset_password_confirm".to_string(),
            conceal_unknown_email: false,
            invalidate_sibling_tokens: true,
        }
    }
}

/// Coordinates the user store, the token store, the hasher and the mailer
#[derive(Debug)]
pub struct PasswordResetService<U, T, H>
where
    U: UserRepository,
    T: PasswordResetTokenRepository,
    H: PasswordHasher,
{
    users: Arc<U>,
    tokens: Arc<T>,
    hasher: Arc<H>,
    mailer: Arc<dyn Mailer>,
    generator: ResetTokenGenerator,
    settings: PasswordResetSettings,
}

impl<U, T, H> PasswordResetService<U, T, H>
where
    U: UserRepository,
    T: PasswordResetTokenRepository,
    H: PasswordHasher,
{
    pub fn new(
        users: Arc<U>,
        tokens: Arc<T>,
        hasher: Arc<H>,
        mailer: Arc<dyn Mailer>,
        settings: PasswordResetSettings,
    ) -> Self {
        Self {
            users,
            tokens,
            hasher,
            mailer,
            generator: ResetTokenGenerator::new(),
            settings,
        }
    }

    /// Issue a fresh token for the user registered under `email`.
    ///
    /// Returns the raw token, or `None` when no user has that email. Earlier
    /// tokens of the same user stay valid.
    pub async fn issue_token(&self, email: &str) -> Result<Option<String>, PasswordResetError> {
        let Some(user) = self.users.get_by_email(email).await? else {
            return Ok(None);
        };

        let generated = self.generator.generate();
        let record = PasswordResetToken::new(
            generated.digest,
            user.id().clone(),
            self.settings.token_ttl,
        );

        self.tokens.save(record).await?;
        debug!(user_id = %user.id(), "Password reset token issued");

        Ok(Some(generated.token))
    }

    /// Issue a token and mail the reset link to `email`
    pub async fn request_reset(&self, email: &str) -> Result<(), PasswordResetError> {
        if email.trim().is_empty() {
            return Err(PasswordResetError::Validation(
                "Email is required".to_string(),
            ));
        }

        let Some(token) = self.issue_token(email).await? else {
            if self.settings.conceal_unknown_email {
                info!("Password reset requested for an unregistered email");
                return Ok(());
            }
            return Err(PasswordResetError::EmailNotFound);
        };

        let message = EmailMessage::new(email, RESET_MAIL_SUBJECT, self.reset_mail_body(&token));

        if let Err(e) = self.mailer.send_email(&message).await {
            warn!(error = %e, "Password reset mail delivery failed");
            if let Err(cleanup) = self.tokens.delete(&TokenDigest::of(&token)).await {
                warn!(error = %cleanup, "Failed to discard undelivered reset token");
            }
            return Err(PasswordResetError::Delivery(e.to_string()));
        }

        info!("Password reset mail sent");
        Ok(())
    }

    /// Consume `token` and set the owning user's password.
    ///
    /// Input is validated before any store is touched, so a mismatch leaves
    /// the token redeemable.
    pub async fn redeem(
        &self,
        token: &str,
        new_password: &str,
        confirmation: &str,
    ) -> Result<(), PasswordResetError> {
        validate_password_confirmation(new_password, confirmation)?;

        if token.is_empty() {
            return Err(PasswordResetError::TokenInvalid);
        }

        let Some(record) = self.tokens.take(&TokenDigest::of(token)).await? else {
            debug!("Password reset rejected: unknown or consumed token");
            return Err(PasswordResetError::TokenInvalid);
        };

        if record.is_expired_at(Utc::now()) {
            debug!(user_id = %record.user_id(), "Password reset rejected: token expired");
            return Err(PasswordResetError::TokenInvalid);
        }

        let user = match self.apply_new_password(&record, new_password).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!(user_id = %record.user_id(), "Password reset token owner no longer exists");
                return Err(PasswordResetError::TokenInvalid);
            }
            Err(e) => {
                // The password is unchanged, so the token must stay redeemable
                let user_id = record.user_id().clone();
                if let Err(restore) = self.tokens.save(record).await {
                    warn!(user_id = %user_id, error = %restore, "Failed to restore reset token");
                }
                return Err(e);
            }
        };

        if self.settings.invalidate_sibling_tokens {
            let removed = self.tokens.delete_for_user(user.id()).await?;
            if removed > 0 {
                debug!(user_id = %user.id(), removed, "Discarded remaining reset tokens");
            }
        }

        info!(user_id = %user.id(), "Password reset completed");
        Ok(())
    }

    /// Hash `new_password` and store it on the token owner, if the owner still exists
    async fn apply_new_password(
        &self,
        record: &PasswordResetToken,
        new_password: &str,
    ) -> Result<Option<User>, PasswordResetError> {
        let Some(mut user) = self.users.get(record.user_id()).await? else {
            return Ok(None);
        };

        let password_hash = self.hasher.hash(new_password)?;
        user.set_password_hash(password_hash);
        self.users.update(&user).await?;

        Ok(Some(user))
    }

    /// Remove every expired token, returning how many were removed
    pub async fn purge_expired(&self) -> Result<usize, PasswordResetError> {
        let removed = self.tokens.delete_expired(Utc::now()).await?;
        if removed > 0 {
            info!(removed, "Purged expired password reset tokens");
        }
        Ok(removed)
    }

    fn reset_mail_body(&self, token: &str) -> String {
        let link = format!("{}?token={}", self.settings.reset_link_base, token);
        format!(
            "<p>We received a request to reset your password.</p>\
             <p>Click the link below to choose a new password:</p>\
             <p><a href=\"{link}\">Reset password</a></p>\
             <p>If you did not ask for this, you can ignore this email.</p>"
        )
    }
}
