//! Server configuration from environment variables.

use std::env;
use std::net::SocketAddr;

/// Runtime configuration for the API server.
///
/// Every value has a development-friendly default so `cargo run` works out
/// of the box; production deployments set the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind host (HOST, default 127.0.0.1).
    pub host: String,

    /// Bind port (PORT, default 3000).
    pub port: u16,

    /// SQLite database file path (DATABASE_PATH, default storefront.db).
    pub database_path: String,

    /// HMAC secret for JWT signing (JWT_SECRET).
    pub jwt_secret: String,

    /// Token lifetime in seconds (JWT_TTL_SECS, default 24h).
    pub jwt_ttl_secs: i64,
}

impl Config {
    /// Loads configuration from the environment.
    pub fn from_env() -> Self {
        Config {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "storefront.db".to_string()),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "dev-secret-change-in-production".to_string()),
            jwt_ttl_secs: env::var("JWT_TTL_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(60 * 60 * 24),
        }
    }

    /// Socket address to bind.
    pub fn addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], self.port)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        // Not touching the real environment here; defaults only.
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 3000,
            database_path: "storefront.db".to_string(),
            jwt_secret: "secret".to_string(),
            jwt_ttl_secs: 86400,
        };

        assert_eq!(config.addr().port(), 3000);
    }
}
