//! Registration and credential checks.
//!
//! Each call is a straight pipeline (validate → look up → hash → persist);
//! any stage can stop it with an [`AuthError`].

use helmios_api::{ServiceError, crypto, service};

use crate::error::AuthError;
use crate::storage::{Db, Registration};

#[derive(Clone)]
pub struct AuthService {
    db: Db,
    password_rounds: u32,
}

impl AuthService {
    pub fn new(db: Db, password_rounds: u32) -> Self {
        Self {
            db,
            password_rounds,
        }
    }

    /// Register a user against an invite code. Returns the new user id.
    ///
    /// The invite is checked before anything else and consumed only when
    /// the user row is written.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        invite_code: &str,
    ) -> Result<String, AuthError> {
        let Some(code) = service::normalize_invite_code(invite_code) else {
            return Err(AuthError::InvalidInvite);
        };
        if self.db.find_invite_code(&code)?.is_none() {
            tracing::info!("invalid invite code: {code}");
            return Err(AuthError::InvalidInvite);
        }

        let username = service::validate_username(username)?;
        service::validate_password(password)?;

        if self.db.find_user_by_username(&username)?.is_some() {
            tracing::info!("username already exists: {username}");
            return Err(AuthError::UsernameTaken);
        }

        let password_hash = self.hash(password).await?;

        match self.db.register_user(&username, &password_hash, &code)? {
            Registration::Created(user_id) => {
                tracing::info!("user registered: {username} ({user_id}) with invite {code}");
                Ok(user_id)
            }
            Registration::InviteNotFound => {
                tracing::warn!("invite {code} was redeemed concurrently");
                Err(AuthError::InvalidInvite)
            }
            Registration::UsernameTaken => Err(AuthError::UsernameTaken),
        }
    }

    /// Check a username/password pair. Returns the user id.
    ///
    /// Unknown users and wrong passwords are indistinguishable to callers.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let Ok(username) = service::validate_username(username) else {
            return Err(AuthError::InvalidCredentials);
        };
        let Some(user) = self.db.find_user_by_username(&username)? else {
            return Err(AuthError::InvalidCredentials);
        };

        let password = password.to_string();
        let stored = user.password_hash;
        let matches = tokio::task::spawn_blocking(move || crypto::verify_password(&password, &stored))
            .await
            .map_err(|e| ServiceError::Internal(format!("verify task failed: {e}")))?;

        if matches {
            Ok(user.id)
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    /// PBKDF2 is deliberately slow; keep it off the async workers.
    async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_string();
        let rounds = self.password_rounds;
        let hash = tokio::task::spawn_blocking(move || crypto::hash_password(&password, rounds))
            .await
            .map_err(|e| ServiceError::Internal(format!("hash task failed: {e}")))??;
        Ok(hash)
    }
}
