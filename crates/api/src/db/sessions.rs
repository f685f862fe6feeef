//! Login session query builders.
//!
//! Timestamps are SQLite `datetime` strings (`%Y-%m-%d %H:%M:%S`, UTC) so
//! they compare correctly as text.

use sea_query::{Expr, Query, SqliteQueryBuilder};

use super::Built;
use super::tables::Sessions;

/// Insert a session row.
pub fn insert(token_hash: &str, user_id: &str, expires_at: &str) -> Built {
    Query::insert()
        .into_table(Sessions::Table)
        .columns([Sessions::TokenHash, Sessions::UserId, Sessions::ExpiresAt])
        .values_panic([token_hash.into(), user_id.into(), expires_at.into()])
        .build(SqliteQueryBuilder)
}

/// Resolve an unexpired session to its user id.
pub fn get_active_user(token_hash: &str, now: &str) -> Built {
    Query::select()
        .column(Sessions::UserId)
        .from(Sessions::Table)
        .and_where(Expr::col(Sessions::TokenHash).eq(token_hash))
        .and_where(Expr::col(Sessions::ExpiresAt).gt(now))
        .build(SqliteQueryBuilder)
}

/// Delete one session.
pub fn delete(token_hash: &str) -> Built {
    Query::delete()
        .from_table(Sessions::Table)
        .and_where(Expr::col(Sessions::TokenHash).eq(token_hash))
        .build(SqliteQueryBuilder)
}

/// Delete every session that expired at or before `now`.
pub fn delete_expired(now: &str) -> Built {
    Query::delete()
        .from_table(Sessions::Table)
        .and_where(Expr::col(Sessions::ExpiresAt).lte(now))
        .build(SqliteQueryBuilder)
}
