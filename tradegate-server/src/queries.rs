use sqlx::{postgres::PgRow, Row};
use tradegate_core::{Session, UserRecord};
use crate::errors::ServerResult;

/// SQL queries for server database operations
pub struct Queries;

impl Queries {
    // User queries
    pub const GET_USER_BY_TELEGRAM_ID: &'static str = r#"
        SELECT id, telegram_id, username, first_name, last_name,
               is_admin, created_at, updated_at
        FROM users
        WHERE telegram_id = $1
    "#;

    pub const LIST_USERS_NEWEST_FIRST: &'static str = r#"
        SELECT id, telegram_id, username, first_name, last_name,
               is_admin, created_at, updated_at
        FROM users
        ORDER BY created_at DESC, telegram_id DESC
    "#;

    pub const UPSERT_USER: &'static str = r#"
        INSERT INTO users (
            id, telegram_id, username, first_name, last_name,
            is_admin, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (telegram_id) DO UPDATE
        SET username = EXCLUDED.username,
            first_name = EXCLUDED.first_name,
            last_name = EXCLUDED.last_name,
            is_admin = EXCLUDED.is_admin,
            updated_at = EXCLUDED.updated_at
        RETURNING id
    "#;

    // Session queries
    pub const GET_SESSION: &'static str = r#"
        SELECT token_hash, telegram_id, created_at, expires_at
        FROM sessions
        WHERE token_hash = $1
    "#;

    pub const CREATE_SESSION: &'static str = r#"
        INSERT INTO sessions (token_hash, telegram_id, created_at, expires_at)
        VALUES ($1, $2, $3, $4)
    "#;

    pub const DELETE_SESSION: &'static str = r#"
        DELETE FROM sessions
        WHERE token_hash = $1
    "#;

    pub const DELETE_EXPIRED_SESSIONS: &'static str = r#"
        DELETE FROM sessions
        WHERE expires_at <= NOW()
    "#;
}

/// Parse a user record from a database row
pub fn parse_user(row: &PgRow) -> ServerResult<UserRecord> {
    Ok(UserRecord {
        id: row.try_get("id")?,
        telegram_id: row.try_get("telegram_id")?,
        username: row.try_get("username")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        is_admin: row.try_get("is_admin")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Parse a session from a database row
pub fn parse_session(row: &PgRow) -> ServerResult<Session> {
    Ok(Session {
        token_hash: row.try_get("token_hash")?,
        telegram_id: row.try_get("telegram_id")?,
        created_at: row.try_get("created_at")?,
        expires_at: row.try_get("expires_at")?,
    })
}
