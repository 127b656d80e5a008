//! Credential and session lifecycle: sign-up, sign-in, refresh and sign-out.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use keyward_core::config::{AuthConfig, SessionConfig};
use keyward_core::error::{AppError, ErrorKind};
use keyward_database::repositories::UserRepository;
use keyward_entity::user::{CreateUser, User};

use crate::error::{AuthError, AuthResult, TokenError};
use crate::jwt::{AccessClaims, IssuedToken, JwtDecoder, JwtEncoder, RefreshClaims, TokenPair};
use crate::password::{CredentialValidator, PasswordHasher};

use super::store::{SessionStore, bounded};

/// Orchestrates the credential and session lifecycle.
///
/// Holds no mutable state of its own: a session exists only as the pair
/// of tokens the client holds plus the refresh token's membership in the
/// user's stored set.
#[derive(Clone)]
pub struct SessionManager {
    /// JWT encoder for token generation.
    jwt_encoder: Arc<JwtEncoder>,
    /// JWT decoder for token validation.
    jwt_decoder: Arc<JwtDecoder>,
    /// Refresh token sets.
    session_store: Arc<SessionStore>,
    /// User repository.
    user_repo: Arc<dyn UserRepository>,
    /// Password hasher.
    password_hasher: Arc<PasswordHasher>,
    /// Sign-up policy.
    validator: Arc<CredentialValidator>,
    /// Per-call repository timeout.
    store_timeout: Duration,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("session_store", &self.session_store)
            .field("store_timeout", &self.store_timeout)
            .finish()
    }
}

impl SessionManager {
    /// Creates a new session manager with all required dependencies.
    pub fn new(
        jwt_encoder: Arc<JwtEncoder>,
        jwt_decoder: Arc<JwtDecoder>,
        session_store: Arc<SessionStore>,
        user_repo: Arc<dyn UserRepository>,
        password_hasher: Arc<PasswordHasher>,
        validator: Arc<CredentialValidator>,
        session_config: &SessionConfig,
    ) -> Self {
        Self {
            jwt_encoder,
            jwt_decoder,
            session_store,
            user_repo,
            password_hasher,
            validator,
            store_timeout: session_config.store_timeout(),
        }
    }

    /// Builds every component from configuration around a repository.
    pub fn from_config(
        auth_config: &AuthConfig,
        session_config: &SessionConfig,
        user_repo: Arc<dyn UserRepository>,
    ) -> Result<Self, AppError> {
        auth_config.validate()?;
        session_config.validate()?;

        Ok(Self::new(
            Arc::new(JwtEncoder::new(auth_config)),
            Arc::new(JwtDecoder::new(auth_config)),
            Arc::new(SessionStore::new(user_repo.clone(), session_config)),
            user_repo,
            Arc::new(PasswordHasher::new(auth_config)?),
            Arc::new(CredentialValidator::new(auth_config)),
            session_config,
        ))
    }

    /// The decoder, for components that verify tokens on their own.
    pub fn jwt_decoder(&self) -> Arc<JwtDecoder> {
        self.jwt_decoder.clone()
    }

    /// The session store, for components that maintain token sets.
    pub fn session_store(&self) -> Arc<SessionStore> {
        self.session_store.clone()
    }

    /// Registers a new user.
    ///
    /// 1. Validate email and password policy (first failure wins)
    /// 2. Reject an already registered email
    /// 3. Hash the password
    /// 4. Persist the user with an empty refresh set
    pub async fn sign_up(&self, email: &str, name: &str, password: &str) -> AuthResult<()> {
        self.validator.validate_sign_up(email, password)?;

        if self.find_user(email).await?.is_some() {
            warn!(email = %email, "Sign-up rejected: email already registered");
            return Err(AuthError::Conflict(email.to_string()));
        }

        let password_hash = self.password_hasher.hash(password).await?;

        let data = CreateUser {
            email: email.to_string(),
            name: name.to_string(),
            password_hash,
        };

        match bounded(self.store_timeout, "create_user", self.user_repo.create(&data)).await {
            Ok(_) => {
                info!(email = %email, "User created");
                Ok(())
            }
            // Lost a race with a concurrent sign-up for the same email.
            Err(e) if e.kind == ErrorKind::Conflict => {
                warn!(email = %email, "Sign-up rejected: email already registered");
                Err(AuthError::Conflict(email.to_string()))
            }
            Err(e) => {
                error!(email = %email, error = %e, "Sign-up failed");
                Err(e.into())
            }
        }
    }

    /// Authenticates a user and opens a new session.
    ///
    /// Unknown email and wrong password both yield
    /// [`AuthError::InvalidCredentials`]; only the logs tell them apart.
    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<TokenPair> {
        let Some(user) = self.find_user(email).await? else {
            warn!(email = %email, reason = "user not found", "Sign-in rejected");
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .password_hasher
            .verify(password, &user.password_hash)
            .await?
        {
            warn!(email = %email, reason = "password mismatch", "Sign-in rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.jwt_encoder.issue_pair(&user.email, &user.name)?;

        match self
            .session_store
            .add_refresh_token(&user.email, &tokens.refresh_token)
            .await
        {
            Ok(()) => {}
            Err(AuthError::UserNotFound) => {
                warn!(email = %email, reason = "user removed during sign-in", "Sign-in rejected");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        }

        info!(email = %email, "Sign-in successful");
        Ok(tokens)
    }

    /// Verifies an access token. Never consults the repository.
    pub fn check_access(&self, access_token: &str) -> AuthResult<AccessClaims> {
        self.jwt_decoder.verify_access(access_token).map_err(|e| {
            warn!(reason = %e, "Access token rejected");
            AuthError::InvalidToken(e)
        })
    }

    /// Validates a refresh token: signature, expiry, and membership in
    /// the subject's active set. Any failure yields `None`.
    pub async fn refresh_session(&self, refresh_token: &str) -> Option<RefreshClaims> {
        match self.validate_refresh(refresh_token).await {
            Ok(claims) => Some(claims),
            Err(e) if e.is_unauthenticated() => None,
            Err(e) => {
                error!(error = %e, "Refresh token validation failed");
                None
            }
        }
    }

    /// Issues a new access token from a valid refresh token, carrying the
    /// user's current display name. The refresh token stays in use.
    pub async fn refresh_access(&self, refresh_token: &str) -> AuthResult<IssuedToken> {
        let claims = self.validate_refresh(refresh_token).await?;
        let user = self.subject_of(&claims).await?;

        let access = self.jwt_encoder.issue_access(&user.email, &user.name)?;
        info!(email = %user.email, "Access token refreshed");
        Ok(access)
    }

    /// Exchanges a valid refresh token for a new token pair.
    ///
    /// The old refresh token is swapped for the new one in a single
    /// store update. If the old token was revoked in the meantime the
    /// rotation fails and the new pair is discarded.
    pub async fn rotate(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        let claims = self.validate_refresh(refresh_token).await?;
        let user = self.subject_of(&claims).await?;

        let tokens = self.jwt_encoder.issue_pair(&user.email, &user.name)?;

        if !self
            .session_store
            .rotate(&user.email, refresh_token, &tokens.refresh_token)
            .await?
        {
            warn!(email = %user.email, reason = %TokenError::Revoked, "Rotation rejected");
            return Err(TokenError::Revoked.into());
        }

        info!(email = %user.email, "Refresh token rotated");
        Ok(tokens)
    }

    /// Ends the session the refresh token belongs to.
    ///
    /// A token that fails verification is an error. A token that verifies
    /// but was already revoked, or whose user no longer exists, is a
    /// successful no-op.
    pub async fn sign_out(&self, refresh_token: &str) -> AuthResult<()> {
        let claims = self.jwt_decoder.verify_refresh(refresh_token).map_err(|e| {
            warn!(reason = %e, "Sign-out rejected");
            AuthError::InvalidToken(e)
        })?;

        match self.session_store.revoke(&claims.sub, refresh_token).await {
            Ok(()) => {
                info!(email = %claims.sub, "Signed out");
                Ok(())
            }
            Err(AuthError::UserNotFound) => {
                info!(email = %claims.sub, "Sign-out for removed user; nothing to revoke");
                Ok(())
            }
            Err(e) => {
                error!(email = %claims.sub, error = %e, "Sign-out failed");
                Err(e)
            }
        }
    }

    /// Number of open sessions (stored refresh tokens) for a user.
    pub async fn active_session_count(&self, email: &str) -> AuthResult<usize> {
        Ok(self.session_store.active_tokens(email).await?.len())
    }

    /// Number of registered users.
    pub async fn user_count(&self) -> AuthResult<u64> {
        Ok(bounded(self.store_timeout, "count_users", self.user_repo.count()).await?)
    }

    async fn validate_refresh(&self, refresh_token: &str) -> AuthResult<RefreshClaims> {
        let claims = self.jwt_decoder.verify_refresh(refresh_token).map_err(|e| {
            warn!(reason = %e, "Refresh token rejected");
            AuthError::InvalidToken(e)
        })?;

        let active = match self.session_store.is_active(&claims.sub, refresh_token).await {
            Ok(active) => active,
            Err(AuthError::UserNotFound) => false,
            Err(e) => return Err(e),
        };

        if !active {
            warn!(email = %claims.sub, reason = %TokenError::Revoked, "Refresh token rejected");
            return Err(TokenError::Revoked.into());
        }

        Ok(claims)
    }

    async fn subject_of(&self, claims: &RefreshClaims) -> AuthResult<User> {
        self.find_user(&claims.sub)
            .await?
            .ok_or(AuthError::InvalidToken(TokenError::Revoked))
    }

    async fn find_user(&self, email: &str) -> AuthResult<Option<User>> {
        Ok(bounded(
            self.store_timeout,
            "find_by_email",
            self.user_repo.find_by_email(email),
        )
        .await?)
    }
}
