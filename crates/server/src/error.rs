use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use helmios_api::ServiceError;

/// Failure inside the credential store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(&'static str),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl StoreError {
    /// Classify a write error, naming the constraint that a conflict hit.
    ///
    /// Only UNIQUE failures count as conflicts; foreign-key and NOT NULL
    /// failures stay plain SQLite errors.
    pub(crate) fn from_write(constraint: &'static str) -> impl FnOnce(rusqlite::Error) -> Self {
        move |e| match &e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Self::UniqueViolation(constraint)
            }
            _ => Self::Sqlite(e),
        }
    }
}

/// Outcome of a failed registration or login.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid invite code")]
    InvalidInvite,

    #[error("username already exists")]
    UsernameTaken,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UniqueViolation(USERNAME_CONSTRAINT) => Self::UsernameTaken,
            other => Self::Store(other),
        }
    }
}

/// Constraint name reported when a username is already registered.
pub const USERNAME_CONSTRAINT: &str = "users.username";

/// Constraint name reported when an invite code already exists.
pub const INVITE_CODE_CONSTRAINT: &str = "invite_codes.code";

/// Plain-text error page.
///
/// Internal details are logged server-side and never sent to the client.
#[derive(Debug)]
pub struct PageErr {
    status: StatusCode,
    message: &'static str,
}

impl PageErr {
    pub fn bad_request(msg: &'static str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg,
        }
    }

    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Internal Server Error",
        }
    }

    /// Build a closure that logs a store/IO error and returns `500 Internal Server Error`.
    pub fn from_store<E: fmt::Display>(context: &str) -> impl FnOnce(E) -> Self + '_ {
        move |e| {
            tracing::error!("{context}: {e}");
            Self::internal()
        }
    }
}

impl IntoResponse for PageErr {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}
