//! Storage seams used by the handlers.
//!
//! `ServerDatabase` implements both traits against Postgres. The in-memory
//! stores here back the router tests and local experiments.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use async_trait::async_trait;
use dashmap::DashMap;
use tradegate_core::{GateError, Session, UserRecord};
use crate::errors::ServerResult;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_telegram_id(&self, telegram_id: i64) -> ServerResult<Option<UserRecord>>;

    /// Every user, most recently created first.
    async fn list_newest_first(&self) -> ServerResult<Vec<UserRecord>>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn find_session(&self, token_hash: &str) -> ServerResult<Option<Session>>;

    async fn insert_session(&self, session: &Session) -> ServerResult<()>;

    async fn delete_session(&self, token_hash: &str) -> ServerResult<bool>;
}

/// Sorts in place by `created_at` descending, ties by `telegram_id` descending.
pub fn sort_newest_first(users: &mut [UserRecord]) {
    users.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.telegram_id.cmp(&a.telegram_id))
    });
}

#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<DashMap<i64, UserRecord>>,
    queries: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any record with the same telegram id.
    pub fn insert(&self, user: UserRecord) {
        self.users.insert(user.telegram_id, user);
    }

    /// Number of reads served since creation.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// When set, every read fails with a storage error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn begin_query(&self) -> ServerResult<()> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(GateError::Storage("memory store is unavailable".to_string()).into());
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_telegram_id(&self, telegram_id: i64) -> ServerResult<Option<UserRecord>> {
        self.begin_query()?;
        Ok(self.users.get(&telegram_id).map(|entry| entry.value().clone()))
    }

    async fn list_newest_first(&self) -> ServerResult<Vec<UserRecord>> {
        self.begin_query()?;
        let mut users: Vec<UserRecord> = self
            .users
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        sort_newest_first(&mut users);
        Ok(users)
    }
}

#[derive(Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<DashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn find_session(&self, token_hash: &str) -> ServerResult<Option<Session>> {
        Ok(self.sessions.get(token_hash).map(|entry| entry.value().clone()))
    }

    async fn insert_session(&self, session: &Session) -> ServerResult<()> {
        self.sessions
            .insert(session.token_hash.clone(), session.clone());
        Ok(())
    }

    async fn delete_session(&self, token_hash: &str) -> ServerResult<bool> {
        Ok(self.sessions.remove(token_hash).is_some())
    }
}
