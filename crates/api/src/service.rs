//! Shared business rules: framework-agnostic pure functions.
//!
//! Route handlers and the auth service call these before touching storage.

use crate::ServiceError;

const USERNAME_MAX_CHARS: usize = 64;
const PASSWORD_MAX_CHARS: usize = 128;
const INVITE_CODE_MAX_CHARS: usize = 64;

/// Validate and normalize a username. Returns the trimmed username.
pub fn validate_username(username: &str) -> Result<String, ServiceError> {
    let trimmed = username.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > USERNAME_MAX_CHARS {
        return Err(ServiceError::BadRequest(format!(
            "username must be 1-{USERNAME_MAX_CHARS} characters"
        )));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(ServiceError::BadRequest(
            "username must not contain control characters".into(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Validate a password. Passwords are taken verbatim, whitespace included.
pub fn validate_password(password: &str) -> Result<(), ServiceError> {
    let len = password.chars().count();
    if len == 0 {
        return Err(ServiceError::BadRequest("password must not be empty".into()));
    }
    if len > PASSWORD_MAX_CHARS {
        return Err(ServiceError::BadRequest(format!(
            "password must be at most {PASSWORD_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

/// Normalize an invite code. `None` means it cannot possibly be valid.
pub fn normalize_invite_code(code: &str) -> Option<String> {
    let trimmed = code.trim();
    if trimmed.is_empty() || trimmed.chars().count() > INVITE_CODE_MAX_CHARS {
        return None;
    }
    Some(trimmed.to_string())
}
