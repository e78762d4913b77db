use std::net::SocketAddr;

use anyhow::Context;

use crate::error::{AppError, Result};

/// A century; longer lifetimes overflow timestamp arithmetic.
pub const MAX_SESSION_TTL_DAYS: i64 = 36_500;

/// Process configuration, read from the environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub settings: Settings,
}

/// The part of the configuration request handlers need.
#[derive(Debug, Clone)]
pub struct Settings {
    pub session_ttl_days: i64,
    /// Accounts registered with one of these emails become administrators.
    pub admin_emails: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            session_ttl_days: 7,
            admin_emails: Vec::new(),
        }
    }
}

impl Settings {
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails
            .iter()
            .any(|e| e.eq_ignore_ascii_case(email))
    }

    pub fn session_ttl(&self) -> Result<chrono::Duration> {
        chrono::Duration::try_days(self.session_ttl_days)
            .ok_or_else(|| AppError::Internal("session lifetime out of range".to_string()))
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite:data.db?mode=rwc".to_string());

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:3000".to_string())
            .parse()
            .context("BIND_ADDR must be a socket address like 127.0.0.1:3000")?;

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(v) => v
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
            None => 5,
        };

        let session_ttl_days = match lookup("SESSION_TTL_DAYS") {
            Some(v) => v
                .parse()
                .context("SESSION_TTL_DAYS must be an integer")?,
            None => Settings::default().session_ttl_days,
        };
        if !(1..=MAX_SESSION_TTL_DAYS).contains(&session_ttl_days) {
            anyhow::bail!("SESSION_TTL_DAYS must be between 1 and {}", MAX_SESSION_TTL_DAYS);
        }

        let admin_emails = lookup("ADMIN_EMAILS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|e| !e.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database_url,
            bind_addr,
            max_connections,
            settings: Settings {
                session_ttl_days,
                admin_emails,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.database_url, "sqlite:data.db?mode=rwc");
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.settings.session_ttl_days, 7);
        assert!(config.settings.admin_emails.is_empty());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("SESSION_TTL_DAYS", "30"),
            ("ADMIN_EMAILS", "root@example.com, ops@example.com ,"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.settings.session_ttl_days, 30);
        assert!(config.settings.is_admin_email("ROOT@example.com"));
        assert!(config.settings.is_admin_email("ops@example.com"));
        assert!(!config.settings.is_admin_email("user@example.com"));
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        assert!(Config::from_lookup(lookup(&[("BIND_ADDR", "nope")])).is_err());
        assert!(Config::from_lookup(lookup(&[("SESSION_TTL_DAYS", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[("SESSION_TTL_DAYS", "36501")])).is_err());
        assert!(Config::from_lookup(lookup(&[("SESSION_TTL_DAYS", "100000000")])).is_err());
        assert!(
            Config::from_lookup(lookup(&[("SESSION_TTL_DAYS", "1000000000000000")])).is_err()
        );
        assert!(Config::from_lookup(lookup(&[("DATABASE_MAX_CONNECTIONS", "-1")])).is_err());
    }

    #[test]
    fn test_session_ttl_bounds() {
        let config = Config::from_lookup(lookup(&[("SESSION_TTL_DAYS", "36500")])).unwrap();
        assert_eq!(config.settings.session_ttl().unwrap().num_days(), 36_500);

        let settings = Settings {
            session_ttl_days: i64::MAX,
            ..Settings::default()
        };
        assert!(matches!(settings.session_ttl(), Err(AppError::Internal(_))));
    }
}
