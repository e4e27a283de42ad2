pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod proxy;
pub mod queries;
pub mod store;

use std::sync::Arc;
use axum::{
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use auth::SessionResolver;
use proxy::RegistrationProxy;
use store::UserStore;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub sessions: Arc<dyn SessionResolver>,
    pub proxy: RegistrationProxy,
    pub socket_url: Option<String>,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    // Socket discovery is called cross-origin by browser clients
    let socket: Router<Arc<AppState>> = Router::new()
        .route("/api/socket", get(api::socket_info).options(api::socket_preflight))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type, Authorization"),
        ));

    Router::new()
        .route("/api/admin/users", get(api::list_users))
        .route("/api/proxy/register-key", post(api::register_key))
        .route("/health", get(api::health))
        .merge(socket)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
