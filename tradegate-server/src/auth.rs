use std::sync::Arc;
use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use tradegate_core::{Session, SessionIdentity};
use crate::errors::ServerResult;
use crate::store::SessionStore;

pub const SESSION_TOKEN_PREFIX: &str = "tgs_";
pub const SESSION_COOKIE: &str = "session_token";

/// Resolves the caller of a request. `Ok(None)` means no valid session.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn resolve(&self, headers: &HeaderMap) -> ServerResult<Option<SessionIdentity>>;
}

#[derive(Clone)]
pub struct AuthState {
    sessions: Arc<dyn SessionStore>,
}

impl AuthState {
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self { sessions }
    }

    pub fn generate_session_token() -> String {
        let mut rng = rand::thread_rng();
        let random_bytes: [u8; 32] = rng.gen();
        format!("{}{}", SESSION_TOKEN_PREFIX, hex::encode(random_bytes))
    }

    /// Hex SHA-256 of the token; the only form tokens are stored in.
    pub fn hash_token(token: &str) -> String {
        hex::encode(Sha256::digest(token.as_bytes()))
    }

    /// Bearer token from `Authorization`, falling back to the session cookie.
    pub fn extract_token(headers: &HeaderMap) -> Option<String> {
        let bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty());

        if let Some(token) = bearer {
            return Some(token.to_string());
        }

        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
            .map(|(_, value)| value.to_string())
    }

    /// Stores a new session for `telegram_id` and returns the raw token.
    pub async fn issue_session(&self, telegram_id: i64, ttl: Duration) -> ServerResult<String> {
        let token = Self::generate_session_token();
        let now = Utc::now();
        let session = Session {
            token_hash: Self::hash_token(&token),
            telegram_id,
            created_at: now,
            expires_at: now + ttl,
        };
        self.sessions.insert_session(&session).await?;

        tracing::debug!(telegram_id, expires_at = %session.expires_at, "Issued session");
        Ok(token)
    }

    pub async fn revoke_session(&self, token: &str) -> ServerResult<bool> {
        self.sessions.delete_session(&Self::hash_token(token)).await
    }
}

#[async_trait]
impl SessionResolver for AuthState {
    async fn resolve(&self, headers: &HeaderMap) -> ServerResult<Option<SessionIdentity>> {
        let Some(token) = Self::extract_token(headers) else {
            tracing::debug!("No session token on request");
            return Ok(None);
        };

        if !token.starts_with(SESSION_TOKEN_PREFIX) {
            tracing::warn!("Invalid session token format - must start with {}", SESSION_TOKEN_PREFIX);
            return Ok(None);
        }

        let token_hash = Self::hash_token(&token);
        match self.sessions.find_session(&token_hash).await? {
            Some(session) if session.is_expired_at(Utc::now()) => {
                tracing::debug!(telegram_id = session.telegram_id, "Session expired");
                if let Err(e) = self.sessions.delete_session(&token_hash).await {
                    tracing::warn!(%e, "Failed to remove expired session");
                }
                Ok(None)
            }
            Some(session) => Ok(Some(session.identity())),
            None => {
                tracing::warn!("Unknown session token");
                Ok(None)
            }
        }
    }
}
