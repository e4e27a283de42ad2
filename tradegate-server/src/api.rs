use std::sync::Arc;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use tradegate_core::{SocketInfo, UsersResponse};
use crate::errors::{ApiError, ServerResult, INTERNAL_ERROR_MESSAGE, REGISTER_KEY_FAILED_MESSAGE};
use crate::{proxy, AppState};

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ServerResult<Json<UsersResponse>> {
    let identity = state
        .sessions
        .resolve(&headers)
        .await
        .map_err(|e| {
            tracing::error!(%e, "Failed to resolve session");
            ApiError::internal(INTERNAL_ERROR_MESSAGE)
        })?
        .ok_or_else(|| ApiError::unauthenticated("Unauthorized"))?;

    let caller = state
        .users
        .find_by_telegram_id(identity.telegram_id)
        .await
        .map_err(|e| {
            tracing::error!(%e, telegram_id = identity.telegram_id, "Failed to load caller");
            ApiError::internal(INTERNAL_ERROR_MESSAGE)
        })?;

    match caller {
        Some(user) if user.is_admin => {
            tracing::debug!(caller = %user.display_name(), "Admin listing users");
        }
        Some(_) => {
            tracing::warn!(telegram_id = identity.telegram_id, "Non-admin requested user listing");
            return Err(ApiError::forbidden("Forbidden").into());
        }
        None => {
            tracing::warn!(telegram_id = identity.telegram_id, "Session user has no record");
            return Err(ApiError::forbidden("Forbidden").into());
        }
    }

    let users = state.users.list_newest_first().await.map_err(|e| {
        tracing::error!(%e, "Failed to list users");
        ApiError::internal(INTERNAL_ERROR_MESSAGE)
    })?;

    Ok(Json(UsersResponse { users }))
}

/// POST /api/proxy/register-key
pub async fn register_key(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ServerResult<impl IntoResponse> {
    let payload = proxy::parse_payload(&body).map_err(|e| {
        tracing::error!(%e, "Key registration body is not JSON");
        ApiError::upstream_failure(REGISTER_KEY_FAILED_MESSAGE, e.to_string())
    })?;

    let reply = state.proxy.forward(&payload).await.map_err(|e| {
        tracing::error!(%e, upstream = %state.proxy.upstream(), "Key registration proxy failed");
        ApiError::upstream_failure(REGISTER_KEY_FAILED_MESSAGE, e.to_string())
    })?;

    Ok((reply.status, Json(reply.body)))
}

/// GET /api/socket
pub async fn socket_info(State(state): State<Arc<AppState>>) -> Json<SocketInfo> {
    let message = match &state.socket_url {
        Some(url) => format!("Real-time updates are served by the websocket endpoint at {}", url),
        None => "Real-time updates are served by a separate websocket endpoint".to_string(),
    };

    Json(SocketInfo::ok(message, Utc::now()))
}

/// OPTIONS /api/socket
pub async fn socket_preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub async fn health() -> &'static str {
    "OK"
}
