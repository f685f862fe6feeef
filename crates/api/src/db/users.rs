//! User query builders.

use sea_query::{Asterisk, Expr, Func, Query, SqliteQueryBuilder};

use super::Built;
use super::tables::Users;

/// Column order shared by every full-row user select.
const USER_COLUMNS: [Users; 5] = [
    Users::Id,
    Users::Username,
    Users::PasswordHash,
    Users::InviteCode,
    Users::CreatedAt,
];

// ── User lookups ───────────────────────────────────────────────────────────

/// Find user by exact username (id, username, password_hash, invite_code, created_at).
pub fn get_by_username(username: &str) -> Built {
    Query::select()
        .columns(USER_COLUMNS)
        .from(Users::Table)
        .and_where(Expr::col(Users::Username).eq(username))
        .build(SqliteQueryBuilder)
}

/// Find user by id (same columns as [`get_by_username`]).
pub fn get_by_id(user_id: &str) -> Built {
    Query::select()
        .columns(USER_COLUMNS)
        .from(Users::Table)
        .and_where(Expr::col(Users::Id).eq(user_id))
        .build(SqliteQueryBuilder)
}

/// Check username existence.
pub fn username_exists(username: &str) -> Built {
    Query::select()
        .expr(Expr::expr(Func::count(Expr::col(Asterisk))).gt(0))
        .from(Users::Table)
        .and_where(Expr::col(Users::Username).eq(username))
        .build(SqliteQueryBuilder)
}

/// Count all users.
pub fn count() -> Built {
    Query::select()
        .expr(Func::count(Expr::col(Asterisk)))
        .from(Users::Table)
        .build(SqliteQueryBuilder)
}

// ── User inserts ───────────────────────────────────────────────────────────

/// Insert a user. `created_at` is filled by the column default.
pub fn insert(id: &str, username: &str, password_hash: &str, invite_code: &str) -> Built {
    Query::insert()
        .into_table(Users::Table)
        .columns([
            Users::Id,
            Users::Username,
            Users::PasswordHash,
            Users::InviteCode,
        ])
        .values_panic([
            id.into(),
            username.into(),
            password_hash.into(),
            invite_code.into(),
        ])
        .build(SqliteQueryBuilder)
}
