//! Lampi web entry-point: wires the device views, session endpoints, and
//! OpenAPI docs.

mod server;

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use color_eyre::eyre::WrapErr;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use lampi_web::inbound::http::health::HealthState;
use lampi_web::outbound::persistence::{DbPool, PoolConfig};
use lampi_web::outbound::publish::RedisAssociationPublisher;

use server::ServerConfig;

fn session_key() -> color_eyre::Result<Key> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".into());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(color_eyre::eyre::eyre!(
                    "failed to read session key at {key_path}: {e}"
                ))
            }
        }
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let key = session_key()?;
    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .map(|v| v != "0")
        .unwrap_or(true);
    let bind_addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".into())
        .parse()
        .wrap_err("BIND_ADDR must be a socket address")?;

    let mut config = ServerConfig::new(key, cookie_secure, SameSite::Lax, bind_addr);

    match env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = DbPool::new(PoolConfig::new(url))
                .await
                .wrap_err("failed to build database pool")?;
            config = config.with_db_pool(pool);
        }
        Err(_) => warn!("DATABASE_URL not set; serving fixture devices (dev only)"),
    }

    match env::var("REDIS_URL") {
        Ok(url) => {
            let publisher = RedisAssociationPublisher::connect(&url)
                .await
                .wrap_err("failed to connect association publisher")?;
            config = config.with_publisher(Arc::new(publisher));
        }
        Err(_) => warn!("REDIS_URL not set; association events will be dropped (dev only)"),
    }

    let health_state = web::Data::new(HealthState::new());
    let server = server::create_server(health_state, config)?;
    info!(%bind_addr, "lampi web server listening");
    server.await.wrap_err("server terminated abnormally")
}
