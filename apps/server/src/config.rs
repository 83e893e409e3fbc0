use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use spendquest_core::constants::DEFAULT_ORDER_TIMEOUT;
use spendquest_gateway::{GatewayConfig, DEFAULT_GATEWAY_URL};

use crate::auth::decode_secret_key;

const DEFAULT_TOKEN_TTL_SECS: u64 = 86_400;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// HS256 key for access tokens (32 bytes).
    pub jwt_secret: Vec<u8>,
    pub token_ttl: Duration,
    /// The gateway key secret doubles as the HMAC key for checkout callbacks.
    pub gateway: GatewayConfig,
    pub order_timeout: Duration,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_millis(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

/// The gateway secret keys callback signatures, so it must not be blank.
fn gateway_secret(raw: Option<String>) -> anyhow::Result<String> {
    match raw.map(|s| s.trim().to_string()) {
        Some(secret) if !secret.is_empty() => Ok(secret),
        _ => anyhow::bail!("SQ_GATEWAY_KEY_SECRET is required"),
    }
}

impl Config {
    /// Reads `SQ_*` variables (after loading `.env` when present).
    ///
    /// Malformed optional values fall back to their defaults; a bad listen
    /// address, JWT secret or gateway secret is an error.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = env_or("SQ_LISTEN_ADDR", "0.0.0.0:8080")
            .parse()
            .context("Invalid SQ_LISTEN_ADDR")?;
        let db_path = env_or("SQ_DB_PATH", "./db/app.db");
        let cors_allow = env_or("SQ_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let request_timeout = env_millis("SQ_REQUEST_TIMEOUT_MS", Duration::from_millis(30_000));

        let raw_secret = std::env::var("SQ_JWT_SECRET").context("SQ_JWT_SECRET is required")?;
        let jwt_secret = decode_secret_key(&raw_secret).context("Invalid SQ_JWT_SECRET")?;
        let token_ttl_secs = std::env::var("SQ_TOKEN_TTL_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TOKEN_TTL_SECS);

        let gateway = GatewayConfig {
            base_url: env_or("SQ_GATEWAY_URL", DEFAULT_GATEWAY_URL),
            key_id: env_or("SQ_GATEWAY_KEY_ID", ""),
            key_secret: gateway_secret(std::env::var("SQ_GATEWAY_KEY_SECRET").ok())?,
            ..GatewayConfig::default()
        };

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout,
            jwt_secret,
            token_ttl: Duration::from_secs(token_ttl_secs),
            gateway,
            order_timeout: env_millis("SQ_ORDER_TIMEOUT_MS", DEFAULT_ORDER_TIMEOUT),
        })
    }
}
