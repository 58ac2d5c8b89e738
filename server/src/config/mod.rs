use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use chrono::Duration;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/eventhub";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_BASE_URL: &str = "http://localhost:3001";
const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 14;
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24 * 3;
const MAX_TTL_HOURS: i64 = 24 * 365 * 10;
const DEVELOPMENT_SECRET: &str = "eventhub-development-secret-change-me";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub max_connections: u32,
    /// Origin used to build links sent by mail.
    pub base_url: String,
    pub secret_key: String,
    pub session_ttl: Duration,
    pub token_ttl: Duration,
    pub production: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let production = is_production();

        let secret_key = match env::var("SECRET_KEY") {
            Ok(key) if !key.trim().is_empty() => key,
            _ => {
                tracing::warn!("Config: SECRET_KEY not set, using the development secret");
                DEVELOPMENT_SECRET.to_string()
            }
        };

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            host: parse_var("HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            port: parse_var("PORT", DEFAULT_PORT),
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS),
            base_url: env::var("BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            secret_key,
            session_ttl: hours_var("SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS),
            token_ttl: hours_var("TOKEN_TTL_HOURS", DEFAULT_TOKEN_TTL_HOURS),
            production,
        }
    }

    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            base_url: DEFAULT_BASE_URL.to_string(),
            secret_key: DEVELOPMENT_SECRET.to_string(),
            session_ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
            token_ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
            production: false,
        }
    }
}

pub fn is_production() -> bool {
    env::var("RUST_ENV")
        .map(|v| v.to_lowercase() == "production")
        .unwrap_or(false)
}

fn parse_var<T>(name: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Config: invalid {} '{}', using {}", name, raw, default);
            default
        }),
        Err(_) => default,
    }
}

/// A lifetime in hours between one hour and ten years; anything else falls
/// back to `default_hours`.
fn hours_var(name: &str, default_hours: i64) -> Duration {
    let hours = parse_var(name, default_hours);
    let ttl = Some(hours)
        .filter(|hours| (1..=MAX_TTL_HOURS).contains(hours))
        .and_then(Duration::try_hours);

    ttl.unwrap_or_else(|| {
        tracing::warn!("Config: {} out of range ({}), using {}", name, hours, default_hours);
        Duration::hours(default_hours)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var_falls_back_on_garbage() {
        std::env::set_var("EVENTHUB_TEST_PORT", "not-a-port");
        assert_eq!(parse_var("EVENTHUB_TEST_PORT", 8080u16), 8080);

        std::env::set_var("EVENTHUB_TEST_PORT", " 9000 ");
        assert_eq!(parse_var("EVENTHUB_TEST_PORT", 8080u16), 9000);

        std::env::remove_var("EVENTHUB_TEST_PORT");
        assert_eq!(parse_var("EVENTHUB_TEST_PORT", 8080u16), 8080);
    }

    #[test]
    fn test_hours_var_rejects_out_of_range_values() {
        std::env::set_var("EVENTHUB_TEST_TTL", "9223372036854775807");
        assert_eq!(hours_var("EVENTHUB_TEST_TTL", 72), Duration::hours(72));

        std::env::set_var("EVENTHUB_TEST_TTL", "-5");
        assert_eq!(hours_var("EVENTHUB_TEST_TTL", 72), Duration::hours(72));

        std::env::set_var("EVENTHUB_TEST_TTL", "0");
        assert_eq!(hours_var("EVENTHUB_TEST_TTL", 72), Duration::hours(72));

        std::env::set_var("EVENTHUB_TEST_TTL", "48");
        assert_eq!(hours_var("EVENTHUB_TEST_TTL", 72), Duration::hours(48));

        std::env::remove_var("EVENTHUB_TEST_TTL");
        assert_eq!(hours_var("EVENTHUB_TEST_TTL", 72), Duration::hours(72));
    }

    #[test]
    fn test_default_binds_all_interfaces() {
        let config = Config::default();
        assert_eq!(config.bind_address().to_string(), "0.0.0.0:3001");
        assert_eq!(config.token_ttl, Duration::hours(72));
    }
}
