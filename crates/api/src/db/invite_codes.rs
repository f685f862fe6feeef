//! Invite code query builders.

use sea_query::{Expr, Order, Query, SqliteQueryBuilder};

use super::Built;
use super::tables::InviteCodes;

/// Find invite by exact code (id, code, created_at).
pub fn get_by_code(code: &str) -> Built {
    Query::select()
        .columns([InviteCodes::Id, InviteCodes::Code, InviteCodes::CreatedAt])
        .from(InviteCodes::Table)
        .and_where(Expr::col(InviteCodes::Code).eq(code))
        .build(SqliteQueryBuilder)
}

/// List every outstanding invite, oldest first.
pub fn list() -> Built {
    Query::select()
        .columns([InviteCodes::Id, InviteCodes::Code, InviteCodes::CreatedAt])
        .from(InviteCodes::Table)
        .order_by(InviteCodes::CreatedAt, Order::Asc)
        .order_by(InviteCodes::Code, Order::Asc)
        .build(SqliteQueryBuilder)
}

/// Insert a new invite code.
pub fn insert(id: &str, code: &str) -> Built {
    Query::insert()
        .into_table(InviteCodes::Table)
        .columns([InviteCodes::Id, InviteCodes::Code])
        .values_panic([id.into(), code.into()])
        .build(SqliteQueryBuilder)
}

/// Delete by code. The affected-row count doubles as the redemption check.
pub fn delete_by_code(code: &str) -> Built {
    Query::delete()
        .from_table(InviteCodes::Table)
        .and_where(Expr::col(InviteCodes::Code).eq(code))
        .build(SqliteQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_targets_single_code() {
        let (sql, values) = delete_by_code("CODE1");
        assert!(sql.starts_with(r#"DELETE FROM "invite_codes""#));
        assert!(sql.contains(r#""code" = ?"#));
        assert_eq!(values.0.len(), 1);
    }

    #[test]
    fn list_is_ordered() {
        let (sql, values) = list();
        assert!(sql.contains("ORDER BY"));
        assert!(values.0.is_empty());
    }
}
