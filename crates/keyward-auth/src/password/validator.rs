//! Sign-up credential policy.

use validator::Validate;

use keyward_core::config::AuthConfig;

use crate::error::{AuthError, AuthResult};

/// Punctuation accepted as the required special character.
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

#[derive(Debug, Validate)]
struct EmailInput {
    #[validate(email(message = "Invalid email format"))]
    email: String,
}

/// Checks sign-up input against the credential policy.
///
/// Rules are evaluated in a fixed order and the first failure is
/// reported; later rules are not evaluated.
#[derive(Debug, Clone)]
pub struct CredentialValidator {
    /// Minimum password length in characters.
    min_length: usize,
}

impl CredentialValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Validates everything sign-up accepts: the email first, then the password.
    pub fn validate_sign_up(&self, email: &str, password: &str) -> AuthResult<()> {
        self.validate_email(email)?;
        self.validate_password(password)
    }

    /// Checks that the email is syntactically valid.
    pub fn validate_email(&self, email: &str) -> AuthResult<()> {
        let input = EmailInput {
            email: email.to_string(),
        };

        input.validate().map_err(|errors| {
            let message = errors
                .field_errors()
                .values()
                .flat_map(|errs| errs.iter())
                .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| "Invalid email format".to_string());
            AuthError::Validation(message)
        })
    }

    /// Checks length, letter, digit, and symbol requirements in that order.
    pub fn validate_password(&self, password: &str) -> AuthResult<()> {
        if password.chars().count() < self.min_length {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        if !password.chars().any(|c| c.is_ascii_alphabetic()) {
            return Err(AuthError::Validation(
                "Password must contain at least one letter".to_string(),
            ));
        }

        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AuthError::Validation(
                "Password must contain at least one number".to_string(),
            ));
        }

        if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
            return Err(AuthError::Validation(
                "Password must contain at least one special character".to_string(),
            ));
        }

        Ok(())
    }
}
