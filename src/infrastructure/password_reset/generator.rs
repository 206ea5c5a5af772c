//! Reset token generation
//!
//! Tokens are random bytes encoded as URL-safe base64 so they can be placed
//! in a reset link without escaping.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;

use crate::domain::password_reset::TokenDigest;

/// A freshly generated token: the raw value goes to the user, the digest to storage
#[derive(Debug, Clone)]
pub struct GeneratedResetToken {
    pub token: String,
    pub digest: TokenDigest,
}

/// Generator for unguessable reset tokens
#[derive(Debug, Clone)]
pub struct ResetTokenGenerator {
    token_bytes: usize,
}

impl ResetTokenGenerator {
    pub fn new() -> Self {
        Self { token_bytes: 32 }
    }

    pub fn generate(&self) -> GeneratedResetToken {
        let mut random_bytes = vec![0u8; self.token_bytes];
        rand::rngs::OsRng.fill_bytes(&mut random_bytes);

        let token = URL_SAFE_NO_PAD.encode(&random_bytes);
        let digest = TokenDigest::of(&token);

        GeneratedResetToken { token, digest }
    }
}

impl Default for ResetTokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_is_url_safe() {
        let generated = ResetTokenGenerator::new().generate();

        // 32 bytes -> 43 base64 characters without padding
        assert_eq!(generated.token.len(), 43);
        assert!(generated
            .token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_digest_matches_token() {
        let generated = ResetTokenGenerator::new().generate();
        assert_eq!(generated.digest, TokenDigest::of(&generated.token));
    }

    #[test]
    fn test_tokens_are_unique() {
        let generator = ResetTokenGenerator::new();
        let tokens: HashSet<String> = (0..200).map(|_| generator.generate().token).collect();

        assert_eq!(tokens.len(), 200);
    }
}
