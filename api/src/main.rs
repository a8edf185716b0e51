//! Agora API server
//!
//! # Usage
//!
//! ```bash
//! agora-api --config agora.toml
//! AGORA_BIND=127.0.0.1:3000 AGORA_JWT_SECRET=... agora-api
//! ```

use std::path::PathBuf;

use agora_api::{build_router, ApiState, ServerConfig};
use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "agora-api")]
#[command(version)]
#[command(about = "Agora community platform API server", long_about = None)]
struct Cli {
    /// TOML config file
    #[arg(long, short, env = "AGORA_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overrides the config file
    #[arg(long, env = "AGORA_BIND")]
    bind: Option<String>,

    /// Session token secret, overrides the config file
    #[arg(long, env = "AGORA_JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long)]
    log: Option<String>,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<ServerConfig> {
        let mut config = ServerConfig::load(self.config.as_deref()).context("loading server config")?;
        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(secret) = self.jwt_secret {
            config.jwt_secret = secret;
        }
        if let Some(log) = self.log {
            config.log_filter = log;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse().into_config()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.uses_dev_secret() {
        tracing::warn!("using the development JWT secret; set AGORA_JWT_SECRET in production");
    }

    let addr = config.socket_addr()?;
    let app = build_router(ApiState::in_memory(config.jwt_secret.clone()), &config);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, version = env!("CARGO_PKG_VERSION"), "agora api listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
