#![allow(dead_code)]

use std::sync::Arc;
use anyhow::{Context, Result};
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use chrono::Duration;
use reqwest::Url;
use tokio::sync::Mutex;
use tower::ServiceExt;
use tradegate_server::{
    auth::{AuthState, SessionResolver},
    build_router,
    proxy::RegistrationProxy,
    store::{MemorySessionStore, MemoryUserStore},
    AppState,
};

pub const UNUSED_UPSTREAM: &str = "https://keys.invalid/api/register-key";

pub struct TestApp {
    pub router: Router,
    pub users: MemoryUserStore,
    pub auth: AuthState,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("response body should be JSON")
    }
}

impl TestApp {
    pub fn new(upstream: &str) -> Self {
        Self::with_options(upstream, None, None)
    }

    /// `resolver` replaces the session-backed resolver when given.
    pub fn with_options(
        upstream: &str,
        socket_url: Option<&str>,
        resolver: Option<Arc<dyn SessionResolver>>,
    ) -> Self {
        let users = MemoryUserStore::new();
        let auth = AuthState::new(Arc::new(MemorySessionStore::new()));
        let upstream = Url::parse(upstream).expect("valid upstream url");
        let proxy = RegistrationProxy::new(upstream, None).expect("http client");

        let state = Arc::new(AppState {
            users: Arc::new(users.clone()),
            sessions: resolver.unwrap_or_else(|| Arc::new(auth.clone()) as Arc<dyn SessionResolver>),
            proxy,
            socket_url: socket_url.map(str::to_string),
        });

        Self {
            router: build_router(state),
            users,
            auth,
        }
    }

    pub async fn login(&self, telegram_id: i64) -> String {
        self.auth
            .issue_session(telegram_id, Duration::hours(1))
            .await
            .expect("issue session")
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");

        TestResponse { status, headers, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }
}

/// A request as the fake upstream saw it.
#[derive(Debug, Clone)]
pub struct Received {
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Clone)]
struct UpstreamState {
    status: StatusCode,
    reply: String,
    received: Arc<Mutex<Vec<Received>>>,
}

pub struct FakeUpstream {
    pub url: String,
    pub received: Arc<Mutex<Vec<Received>>>,
}

/// Serves `reply` with `status` on `/api/register-key` from a local port.
pub async fn spawn_upstream(status: StatusCode, reply: &str) -> Result<FakeUpstream> {
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = UpstreamState {
        status,
        reply: reply.to_string(),
        received: received.clone(),
    };

    let app = Router::new()
        .route("/api/register-key", post(capture))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("Failed to bind fake upstream")?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(FakeUpstream {
        url: format!("http://{}/api/register-key", addr),
        received,
    })
}

async fn capture(
    State(state): State<UpstreamState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.received.lock().await.push(Received {
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: body.to_vec(),
    });

    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.reply.clone(),
    )
        .into_response()
}
