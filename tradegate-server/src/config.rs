use std::time::Duration;
use clap::Parser;
use reqwest::Url;
use tradegate_core::GateError;

#[derive(Debug, Clone, Parser)]
#[command(name = "tradegate-server", version, about = "Admin, key registration proxy and socket info endpoints")]
pub struct Config {
    /// Address the HTTP server listens on
    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0:8080")]
    pub bind_address: String,

    #[arg(long, env = "DATABASE_URL", default_value = "postgres://localhost:5432/tradegate")]
    pub database_url: String,

    /// Upstream endpoint that receives proxied key registrations
    #[arg(long, env = "REGISTER_KEY_URL")]
    pub register_key_url: String,

    /// Upstream request timeout; unset means wait indefinitely
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS")]
    pub upstream_timeout_secs: Option<u64>,

    /// Websocket endpoint advertised by /api/socket
    #[arg(long, env = "SOCKET_URL")]
    pub socket_url: Option<String>,

    #[arg(long, env = "SKIP_MIGRATIONS")]
    pub skip_migrations: bool,

    #[arg(long, env = "RUST_LOG", default_value = "tradegate_server=debug,tower_http=debug")]
    pub log_filter: String,
}

impl Config {
    pub fn register_key_url(&self) -> Result<Url, GateError> {
        Url::parse(&self.register_key_url).map_err(|e| {
            GateError::Configuration(format!("REGISTER_KEY_URL {:?}: {}", self.register_key_url, e))
        })
    }

    pub fn upstream_timeout(&self) -> Option<Duration> {
        self.upstream_timeout_secs.map(Duration::from_secs)
    }
}
