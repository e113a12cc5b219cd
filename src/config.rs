use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Credentials for the bootstrap admin account, upserted on startup.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedAdmin {
    pub email: String,
    pub password: String,
    pub employee_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    /// Where generated packing reports are archived. Reports are only returned
    /// inline when unset.
    pub reports_dir: Option<PathBuf>,
    pub seed_admin: Option<SeedAdmin>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "inventory-admin".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "inventory-admin-staff".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: env_parse("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 14),
        };

        let seed_admin = match (std::env::var("ADMIN_EMAIL"), std::env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(SeedAdmin {
                email: email.trim().to_lowercase(),
                password,
                employee_id: std::env::var("ADMIN_EMPLOYEE_ID").unwrap_or_else(|_| "00XX00".into()),
                name: std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Admin User".into()),
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            max_connections: env_parse("DATABASE_MAX_CONNECTIONS", 10),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_parse("APP_PORT", 8080),
            jwt,
            reports_dir: std::env::var("REPORTS_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            seed_admin,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_parse_falls_back_on_missing_or_garbage() {
        assert_eq!(env_parse::<u16>("INVENTORY_ADMIN_TEST_UNSET_PORT", 8080), 8080);

        std::env::set_var("INVENTORY_ADMIN_TEST_BAD_PORT", "not-a-number");
        assert_eq!(env_parse::<u16>("INVENTORY_ADMIN_TEST_BAD_PORT", 9000), 9000);

        std::env::set_var("INVENTORY_ADMIN_TEST_GOOD_PORT", "3000");
        assert_eq!(env_parse::<u16>("INVENTORY_ADMIN_TEST_GOOD_PORT", 9000), 3000);
    }
}
