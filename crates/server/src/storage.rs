//! Credential store: users, invite codes and login sessions in SQLite.
//!
//! Every write goes straight to disk; there is no batching. The connection
//! sits behind a mutex, so each call is one serialized unit of work.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params_from_iter};
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex};

use helmios_api::db::{self as dbq, Built, migrations::MIGRATIONS};
use helmios_api::{InviteCode, UserProfile};

use crate::error::{INVITE_CODE_CONSTRAINT, StoreError, USERNAME_CONSTRAINT};

/// File name of the database inside the data directory.
pub const DB_FILE: &str = "helmios.db";

/// Shared database state
#[derive(Clone)]
pub struct Db {
    conn: Arc<Mutex<Connection>>,
}

/// A stored user, including the password hash.
#[derive(Clone)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub invite_code: String,
    pub created_at: String,
}

impl UserRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            password_hash: row.get(2)?,
            invite_code: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    /// The dashboard view of this user.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            username: self.username.clone(),
            invite_code: self.invite_code.clone(),
            created_at: self.created_at.clone(),
        }
    }
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("invite_code", &self.invite_code)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Result of [`Db::register_user`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// User created; the invite is gone.
    Created(String),
    /// The invite did not exist (or was redeemed first by someone else).
    InviteNotFound,
    /// Username already registered; the invite was left untouched.
    UsernameTaken,
}

impl Db {
    pub fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    // ── Users ──────────────────────────────────────────────────────────

    /// Exact-match lookup by username.
    pub fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let conn = self.conn();
        Ok(sq_query_row(&conn, dbq::users::get_by_username(username), UserRecord::from_row)
            .optional()?)
    }

    pub fn find_user_by_id(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        let conn = self.conn();
        Ok(sq_query_row(&conn, dbq::users::get_by_id(user_id), UserRecord::from_row).optional()?)
    }

    /// Insert a user and return its generated id.
    ///
    /// The username is checked explicitly before the insert; the UNIQUE
    /// index still backs it up and maps to the same error.
    pub fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        invite_code: &str,
    ) -> Result<String, StoreError> {
        let conn = self.conn();
        if username_taken(&conn, username)? {
            return Err(StoreError::UniqueViolation(USERNAME_CONSTRAINT));
        }
        insert_user(&conn, username, password_hash, invite_code)
    }

    pub fn count_users(&self) -> Result<i64, StoreError> {
        let conn = self.conn();
        Ok(sq_query_row(&conn, dbq::users::count(), |row| row.get(0))?)
    }

    /// Redeem `invite_code` and create the user in a single transaction.
    ///
    /// The invite row is deleted first and the affected-row count decides
    /// whether it was valid, so two concurrent signups can never both
    /// consume the same code. A taken username rolls the deletion back.
    pub fn register_user(
        &self,
        username: &str,
        password_hash: &str,
        invite_code: &str,
    ) -> Result<Registration, StoreError> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let redeemed = sq_execute(&tx, dbq::invite_codes::delete_by_code(invite_code))?;
        if redeemed == 0 {
            return Ok(Registration::InviteNotFound);
        }
        if username_taken(&tx, username)? {
            return Ok(Registration::UsernameTaken);
        }
        let user_id = insert_user(&tx, username, password_hash, invite_code)?;

        tx.commit()?;
        Ok(Registration::Created(user_id))
    }

    // ── Invite codes ───────────────────────────────────────────────────

    pub fn find_invite_code(&self, code: &str) -> Result<Option<InviteCode>, StoreError> {
        let conn = self.conn();
        Ok(sq_query_row(&conn, dbq::invite_codes::get_by_code(code), invite_from_row).optional()?)
    }

    /// Remove an invite code. Deleting a missing code is not an error.
    pub fn delete_invite_code(&self, code: &str) -> Result<(), StoreError> {
        let conn = self.conn();
        sq_execute(&conn, dbq::invite_codes::delete_by_code(code))?;
        Ok(())
    }

    pub fn create_invite_code(&self, code: &str) -> Result<InviteCode, StoreError> {
        let conn = self.conn();
        let id = uuid::Uuid::new_v4().to_string();
        sq_execute(&conn, dbq::invite_codes::insert(&id, code))
            .map_err(StoreError::from_write(INVITE_CODE_CONSTRAINT))?;
        Ok(sq_query_row(&conn, dbq::invite_codes::get_by_code(code), invite_from_row)?)
    }

    pub fn list_invite_codes(&self) -> Result<Vec<InviteCode>, StoreError> {
        let conn = self.conn();
        Ok(sq_query_map(&conn, dbq::invite_codes::list(), invite_from_row)?)
    }

    // ── Sessions ───────────────────────────────────────────────────────

    pub fn insert_session(
        &self,
        token_hash: &str,
        user_id: &str,
        expires_at: &str,
    ) -> Result<(), StoreError> {
        let conn = self.conn();
        sq_execute(&conn, dbq::sessions::insert(token_hash, user_id, expires_at))?;
        Ok(())
    }

    /// User id of an unexpired session, if any.
    pub fn active_session_user(
        &self,
        token_hash: &str,
        now: &str,
    ) -> Result<Option<String>, StoreError> {
        let conn = self.conn();
        Ok(sq_query_row(
            &conn,
            dbq::sessions::get_active_user(token_hash, now),
            |row| row.get(0),
        )
        .optional()?)
    }

    pub fn delete_session(&self, token_hash: &str) -> Result<(), StoreError> {
        let conn = self.conn();
        sq_execute(&conn, dbq::sessions::delete(token_hash))?;
        Ok(())
    }

    /// Drop expired sessions; returns how many were removed.
    pub fn purge_expired_sessions(&self, now: &str) -> Result<usize, StoreError> {
        let conn = self.conn();
        Ok(sq_execute(&conn, dbq::sessions::delete_expired(now))?)
    }
}

fn username_taken(conn: &Connection, username: &str) -> Result<bool, StoreError> {
    Ok(sq_query_row(conn, dbq::users::username_exists(username), |row| row.get(0))?)
}

fn insert_user(
    conn: &Connection,
    username: &str,
    password_hash: &str,
    invite_code: &str,
) -> Result<String, StoreError> {
    let user_id = uuid::Uuid::new_v4().to_string();
    sq_execute(
        conn,
        dbq::users::insert(&user_id, username, password_hash, invite_code),
    )
    .map_err(StoreError::from_write(USERNAME_CONSTRAINT))?;
    Ok(user_id)
}

fn invite_from_row(row: &Row<'_>) -> rusqlite::Result<InviteCode> {
    Ok(InviteCode {
        id: row.get(0)?,
        code: row.get(1)?,
        created_at: row.get(2)?,
    })
}

// ── sea-query binding ──────────────────────────────────────────────────────

fn bind_values(values: &sea_query::Values) -> Vec<rusqlite::types::Value> {
    use rusqlite::types::Value as Sql;
    use sea_query::Value;

    values
        .0
        .iter()
        .map(|v| match v {
            Value::Bool(Some(b)) => Sql::Integer(i64::from(*b)),
            Value::Int(Some(i)) => Sql::Integer(i64::from(*i)),
            Value::BigInt(Some(i)) => Sql::Integer(*i),
            Value::Double(Some(f)) => Sql::Real(*f),
            Value::String(Some(s)) => Sql::Text(s.as_str().to_string()),
            Value::Bytes(Some(b)) => Sql::Blob(b.as_slice().to_vec()),
            _ => Sql::Null,
        })
        .collect()
}

/// Run a built query expected to return exactly one row.
pub fn sq_query_row<T, F>(conn: &Connection, built: Built, f: F) -> rusqlite::Result<T>
where
    F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
{
    let (sql, values) = built;
    conn.query_row(&sql, params_from_iter(bind_values(&values)), f)
}

/// Run a built query and collect every row.
pub fn sq_query_map<T, F>(conn: &Connection, built: Built, f: F) -> rusqlite::Result<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let (sql, values) = built;
    let mut stmt = conn.prepare(&sql)?;
    stmt.query_map(params_from_iter(bind_values(&values)), f)?
        .collect()
}

/// Run a built statement, returning the number of affected rows.
pub fn sq_execute(conn: &Connection, built: Built) -> rusqlite::Result<usize> {
    let (sql, values) = built;
    conn.execute(&sql, params_from_iter(bind_values(&values)))
}

// ── Setup ──────────────────────────────────────────────────────────────────

/// Initialize the database: open connection, enable WAL, run migrations
pub fn init_db(data_dir: &Path) -> Result<Db> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("creating data directory {}", data_dir.display()))?;
    let db_path = data_dir.join(DB_FILE);
    let conn = Connection::open(&db_path).context("opening SQLite database")?;

    // Enable WAL mode for better concurrent read performance
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;

    run_migrations(&conn)?;

    Ok(Db {
        conn: Arc::new(Mutex::new(conn)),
    })
}

fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    for (name, sql) in MIGRATIONS {
        let already_applied: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .with_context(|| format!("checking migration {name}"))?;

        if !already_applied {
            conn.execute_batch(sql)
                .with_context(|| format!("running migration {name}"))?;
            conn.execute("INSERT INTO _migrations (name) VALUES (?1)", [name])?;
            tracing::info!("Applied migration: {name}");
        }
    }

    Ok(())
}

/// Format a timestamp the way SQLite's `datetime('now')` does.
pub fn sqlite_datetime(at: chrono::DateTime<chrono::Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}
