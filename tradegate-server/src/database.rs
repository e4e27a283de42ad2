use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use tradegate_core::{Session, UserRecord};
use uuid::Uuid;
use crate::errors::ServerResult;
use crate::queries::{parse_session, parse_user, Queries};
use crate::store::{SessionStore, UserStore};

pub struct ServerDatabase {
    pub pool: PgPool,
}

impl ServerDatabase {
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> ServerResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await?;
        Ok(())
    }

    /// Inserts the user, or refreshes profile fields and the admin flag of
    /// the existing record with the same telegram id.
    pub async fn upsert_user(&self, user: &UserRecord) -> ServerResult<Uuid> {
        let row = sqlx::query(Queries::UPSERT_USER)
            .bind(user.id)
            .bind(user.telegram_id)
            .bind(&user.username)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.is_admin)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get("id")?)
    }

    pub async fn purge_expired_sessions(&self) -> ServerResult<u64> {
        let result = sqlx::query(Queries::DELETE_EXPIRED_SESSIONS)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl UserStore for ServerDatabase {
    async fn find_by_telegram_id(&self, telegram_id: i64) -> ServerResult<Option<UserRecord>> {
        let row = sqlx::query(Queries::GET_USER_BY_TELEGRAM_ID)
            .bind(telegram_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(parse_user).transpose()
    }

    async fn list_newest_first(&self) -> ServerResult<Vec<UserRecord>> {
        let rows = sqlx::query(Queries::LIST_USERS_NEWEST_FIRST)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(parse_user).collect()
    }
}

#[async_trait]
impl SessionStore for ServerDatabase {
    async fn find_session(&self, token_hash: &str) -> ServerResult<Option<Session>> {
        let row = sqlx::query(Queries::GET_SESSION)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(parse_session).transpose()
    }

    async fn insert_session(&self, session: &Session) -> ServerResult<()> {
        sqlx::query(Queries::CREATE_SESSION)
            .bind(&session.token_hash)
            .bind(session.telegram_id)
            .bind(session.created_at)
            .bind(session.expires_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_session(&self, token_hash: &str) -> ServerResult<bool> {
        let result = sqlx::query(Queries::DELETE_SESSION)
            .bind(token_hash)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
