use std::sync::Arc;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tradegate_server::{
    auth::AuthState,
    build_router,
    config::Config,
    database::ServerDatabase,
    errors::ServerResult,
    proxy::RegistrationProxy,
    AppState,
};

#[tokio::main]
async fn main() -> ServerResult<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .init();

    let register_key_url = config.register_key_url()?;
    let proxy = RegistrationProxy::new(register_key_url, config.upstream_timeout())?;

    let db = match ServerDatabase::new(&config.database_url).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            tracing::error!(%e, "Failed to initialize database");
            return Err(e.into());
        }
    };

    if config.skip_migrations {
        tracing::info!("Skipping database migrations");
    } else if let Err(e) = db.run_migrations().await {
        tracing::error!(%e, "Failed to run migrations");
        return Err(e);
    }

    match db.purge_expired_sessions().await {
        Ok(purged) if purged > 0 => tracing::info!(purged, "Removed expired sessions"),
        Ok(_) => {}
        Err(e) => tracing::warn!(%e, "Failed to purge expired sessions"),
    }

    let app_state = Arc::new(AppState {
        users: db.clone(),
        sessions: Arc::new(AuthState::new(db)),
        proxy,
        socket_url: config.socket_url.clone(),
    });

    let app = build_router(app_state);

    tracing::info!(
        addr = %config.bind_address,
        upstream = %config.register_key_url,
        "Starting tradegate server"
    );

    let listener = match tokio::net::TcpListener::bind(&config.bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%e, addr = %config.bind_address, "Failed to bind");
            return Err(e.into());
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(%e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
