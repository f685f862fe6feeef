//! Shared types, crypto, validation and SQL builders for helmios.
//!
//! Everything here is framework-agnostic: the Axum server owns the
//! connection and the HTTP surface, this crate owns the shapes and rules.

use serde::{Deserialize, Serialize};

pub mod crypto;
pub mod db;
pub mod service;

// ─── Forms ───────────────────────────────────────────────────────────────────

/// `POST /signup` form body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, rename = "inviteCode")]
    pub invite_code: String,
}

/// `POST /login` form body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A registered user as shown on the dashboard. Never carries the hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub invite_code: String,
    pub created_at: String,
}

/// A redeemable invite code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InviteCode {
    pub id: String,
    pub code: String,
    pub created_at: String,
}

/// Returned by `GET /health`: server liveness check.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// ─── Service Error ───────────────────────────────────────────────────────────

/// Framework-agnostic error raised by validation and crypto helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    BadRequest(String),
    Internal(String),
}

impl ServiceError {
    /// HTTP status code as a `u16`.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Internal(_) => 500,
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(m) | Self::Internal(m) => m,
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ServiceError {}
