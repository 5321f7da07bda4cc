use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    pub name: String,
    pub instructor: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            name: "Aviz Academy".into(),
            instructor: "Avinash Reddy Thipparthi".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    /// Exposes store error details in responses. Never enable in production.
    pub debug_mode: bool,
    pub platform: PlatformConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let defaults = PlatformConfig::default();
        let platform = PlatformConfig {
            name: std::env::var("PLATFORM_NAME").unwrap_or(defaults.name),
            instructor: std::env::var("PLATFORM_INSTRUCTOR").unwrap_or(defaults.instructor),
        };
        Ok(Self {
            database_url,
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8080),
            debug_mode: std::env::var("DEBUG_MODE")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            platform,
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
