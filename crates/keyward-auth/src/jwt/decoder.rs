//! JWT token validation.

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use keyward_core::config::AuthConfig;

use crate::error::TokenError;

use super::claims::{AccessClaims, RefreshClaims, TokenClaims, TokenType};

/// Verifies access and refresh tokens.
///
/// Verification is purely local: signature first, then expiry. Whether a
/// refresh token is still in its owner's active set is the session
/// store's question, not this type's.
#[derive(Clone)]
pub struct JwtDecoder {
    access_key: DecodingKey,
    refresh_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against `now >= exp` below, without leeway.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            access_key: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_key: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            validation,
        }
    }

    /// Verifies an access token.
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.verify(token)
    }

    /// Verifies a refresh token's signature and expiry.
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        self.verify(token)
    }

    /// Verifies a token against the secret for `C::KIND`.
    pub fn verify<C: TokenClaims>(&self, token: &str) -> Result<C, TokenError> {
        let key = match C::KIND {
            TokenType::Access => &self.access_key,
            TokenType::Refresh => &self.refresh_key,
        };

        let claims = decode::<C>(token, key, &self.validation)
            .map_err(|e| match e.kind() {
                JwtErrorKind::InvalidSignature | JwtErrorKind::InvalidAlgorithm => {
                    TokenError::Forged
                }
                JwtErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?
            .claims;

        if claims.token_type() != C::KIND {
            return Err(TokenError::Forged);
        }

        if claims.is_expired_at(Utc::now()) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::jwt::JwtEncoder;

    fn config() -> AuthConfig {
        AuthConfig::with_secrets("access-secret-for-tests", "refresh-secret-for-tests")
    }

    /// Replaces one character in the payload segment, keeping valid base64url.
    fn tamper(token: &str) -> String {
        let payload_start = token.find('.').unwrap() + 1;
        let idx = payload_start + 10;
        let mut bytes = token.as_bytes().to_vec();
        bytes[idx] = if bytes[idx] == b'A' { b'B' } else { b'A' };
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_fresh_access_token_verifies() {
        let config = config();
        let encoder = JwtEncoder::new(&config);
        let decoder = JwtDecoder::new(&config);

        let issued = encoder.issue_access("a@b.com", "Ada").unwrap();
        let claims = decoder.verify_access(&issued.token).unwrap();

        assert_eq!(claims.sub, "a@b.com");
        assert_eq!(claims.name, "Ada");
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_fresh_refresh_token_verifies() {
        let config = config();
        let encoder = JwtEncoder::new(&config);
        let decoder = JwtDecoder::new(&config);

        let issued = encoder.issue_refresh("a@b.com").unwrap();
        let claims = decoder.verify_refresh(&issued.token).unwrap();
        assert_eq!(claims.sub, "a@b.com");
    }

    #[test]
    fn test_expired_once_ttl_elapses() {
        let config = config();
        let encoder = JwtEncoder::new(&config);
        let decoder = JwtDecoder::new(&config);

        // Issued exactly one TTL ago: now == exp.
        let at_boundary = Utc::now() - Duration::seconds(config.access_ttl_seconds as i64);
        let token = encoder.issue_access_at("a@b.com", "Ada", at_boundary).unwrap();
        assert_eq!(decoder.verify_access(&token.token), Err(TokenError::Expired));

        let past = Utc::now() - Duration::seconds(config.refresh_ttl_seconds as i64 + 1);
        let token = encoder.issue_refresh_at("a@b.com", past).unwrap();
        assert_eq!(decoder.verify_refresh(&token.token), Err(TokenError::Expired));
    }

    #[test]
    fn test_secrets_are_not_interchangeable() {
        let config = config();
        let encoder = JwtEncoder::new(&config);
        let decoder = JwtDecoder::new(&config);

        let access = encoder.issue_access("a@b.com", "Ada").unwrap();
        let refresh = encoder.issue_refresh("a@b.com").unwrap();

        assert_eq!(
            decoder.verify::<RefreshClaims>(&access.token).unwrap_err(),
            TokenError::Forged
        );
        assert_eq!(
            decoder.verify::<AccessClaims>(&refresh.token).unwrap_err(),
            TokenError::Forged
        );
    }

    #[test]
    fn test_other_deployment_secret_is_forged() {
        let encoder = JwtEncoder::new(&AuthConfig::with_secrets("other-a", "other-r"));
        let decoder = JwtDecoder::new(&config());

        let token = encoder.issue_access("a@b.com", "Ada").unwrap();
        assert_eq!(decoder.verify_access(&token.token), Err(TokenError::Forged));
    }

    #[test]
    fn test_tampered_payload_is_forged() {
        let config = config();
        let encoder = JwtEncoder::new(&config);
        let decoder = JwtDecoder::new(&config);

        let token = encoder.issue_access("a@b.com", "Ada").unwrap();
        assert_eq!(
            decoder.verify_access(&tamper(&token.token)),
            Err(TokenError::Forged)
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        let decoder = JwtDecoder::new(&config());
        assert_eq!(decoder.verify_access("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(decoder.verify_refresh(""), Err(TokenError::Malformed));
    }

    #[test]
    fn test_tokens_issued_together_are_distinct() {
        let encoder = JwtEncoder::new(&config());
        let first = encoder.issue_refresh("a@b.com").unwrap();
        let second = encoder.issue_refresh("a@b.com").unwrap();
        assert_ne!(first.token, second.token);
    }
}
