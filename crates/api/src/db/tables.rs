//! Compile-time–checked column identifiers for all tables.

use sea_query::Iden;

#[derive(Iden)]
pub enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    InviteCode,
    CreatedAt,
}

#[derive(Iden)]
pub enum InviteCodes {
    Table,
    Id,
    Code,
    CreatedAt,
}

#[derive(Iden)]
pub enum Sessions {
    Table,
    TokenHash,
    UserId,
    CreatedAt,
    ExpiresAt,
}
