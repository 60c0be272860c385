use serde::Deserialize;

pub const DEFAULT_EXCHANGE_URL: &str =
    "https://demobackend.emergentagent.com/auth/v1/env/oauth/session-data";

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    pub exchange_url: String,
    pub session_ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub identity: IdentityConfig,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let identity = IdentityConfig {
            exchange_url: std::env::var("IDENTITY_EXCHANGE_URL")
                .unwrap_or_else(|_| DEFAULT_EXCHANGE_URL.into()),
            session_ttl_days: std::env::var("SESSION_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|d| *d > 0)
                .unwrap_or(7),
        };
        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".into()),
        );
        Ok(Self {
            database_url,
            max_connections,
            identity,
            cors_origins,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
