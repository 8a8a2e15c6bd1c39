//! Runtime Configuration
//! Mission: Load every tunable from the environment with safe defaults

use anyhow::{bail, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub jwt_secret: String,
    pub jwt_expires_in_hours: i64,
    pub db_busy_timeout_ms: u64,
    pub admin_email: String,
    pub admin_password: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(8080);

        let database_path = std::env::var("DATABASE_PATH")
            .unwrap_or_else(|_| "./gatekeeper.db".to_string());

        // The signing secret has no sane default; refuse to boot without it.
        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(s) if !s.trim().is_empty() => s,
            _ => bail!("JWT_SECRET must be set to a non-empty value"),
        };

        let jwt_expires_in_hours = std::env::var("JWT_EXPIRES_IN_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse()
            .unwrap_or(24);

        let db_busy_timeout_ms = std::env::var("DB_BUSY_TIMEOUT_MS")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .unwrap_or(5000);

        let admin_email = std::env::var("ADMIN_EMAIL")
            .unwrap_or_else(|_| "admin@gatekeeper.local".to_string());

        let admin_password = std::env::var("ADMIN_PASSWORD")
            .unwrap_or_else(|_| "Admin123change".to_string());

        Ok(Self {
            port,
            database_path,
            jwt_secret,
            jwt_expires_in_hours,
            db_busy_timeout_ms,
            admin_email,
            admin_password,
        })
    }
}
