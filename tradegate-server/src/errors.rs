use std::fmt::{Display, Formatter};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};
use tradegate_core::{ErrorBody, GateError};

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
pub const REGISTER_KEY_FAILED_MESSAGE: &str = "Failed to register key";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("{0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("{0}")]
    ApiError(#[from] ApiError),

    #[error("Upstream request failed: {0}")]
    UpstreamError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    GateError(#[from] GateError),
}

impl From<serde_json::Error> for ServerError {
    fn from(error: serde_json::Error) -> Self {
        ServerError::GateError(GateError::from(error))
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    Unauthenticated(String),
    Forbidden(String),
    InternalServerError(String),
    UpstreamFailure(String, String),
}

impl ApiError {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalServerError(message.into())
    }

    pub fn upstream_failure(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self::UpstreamFailure(message.into(), details.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::InternalServerError(_) | ApiError::UpstreamFailure(..) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Unauthenticated(message) => write!(f, "Status=401, Unauthenticated: {}", message),
            ApiError::Forbidden(message) => write!(f, "Status=403, Forbidden: {}", message),
            ApiError::InternalServerError(message) => write!(f, "Status=500, InternalServerError: {}", message),
            ApiError::UpstreamFailure(message, details) => {
                write!(f, "Status=500, UpstreamFailure: {}. {}", message, details)
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ServerError::ApiError(e) => {
                warn!("{}", e);
                let status = e.status();
                let body = match e {
                    ApiError::Unauthenticated(message)
                    | ApiError::Forbidden(message)
                    | ApiError::InternalServerError(message) => ErrorBody::new(message),
                    ApiError::UpstreamFailure(message, details) => {
                        ErrorBody::new(message).with_details(details)
                    }
                };
                (status, body)
            }
            other => {
                error!(%other, "Unhandled server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new(INTERNAL_ERROR_MESSAGE),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_api_errors_map_to_status_codes() {
        let cases = [
            (ApiError::unauthenticated("Unauthorized"), StatusCode::UNAUTHORIZED),
            (ApiError::forbidden("Forbidden"), StatusCode::FORBIDDEN),
            (ApiError::internal(INTERNAL_ERROR_MESSAGE), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (api_error, expected) in cases {
            let message = match &api_error {
                ApiError::Unauthenticated(m) | ApiError::Forbidden(m) | ApiError::InternalServerError(m) => m.clone(),
                _ => unreachable!(),
            };
            let response = ServerError::from(api_error).into_response();
            assert_eq!(response.status(), expected);

            let body = body_of(response).await;
            assert_eq!(body["error"], message);
            assert!(body.get("details").is_none());
        }
    }

    #[tokio::test]
    async fn test_upstream_failure_carries_details() {
        let response = ServerError::from(ApiError::upstream_failure(
            REGISTER_KEY_FAILED_MESSAGE,
            "connection refused",
        ))
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(response).await;
        assert_eq!(body["error"], REGISTER_KEY_FAILED_MESSAGE);
        assert_eq!(body["details"], "connection refused");
    }

    #[tokio::test]
    async fn test_non_api_errors_hide_their_cause() {
        let response = ServerError::from(GateError::Storage("pool timed out".into())).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(response).await;
        assert_eq!(body["error"], INTERNAL_ERROR_MESSAGE);
        assert!(!body.to_string().contains("pool timed out"));
    }
}
