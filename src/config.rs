use serde::Deserialize;

pub const DEFAULT_NUDGE_COOLDOWN_SECS: u64 = 60;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    /// Minimum gap between two nudges from the same sender to the same friend.
    pub nudge_cooldown_secs: u64,
}

fn parsed_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "wellpulse".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "wellpulse-users".into()),
            ttl_minutes: parsed_var("JWT_TTL_MINUTES").unwrap_or(60),
            refresh_ttl_minutes: parsed_var("JWT_REFRESH_TTL_MINUTES").unwrap_or(60 * 24 * 14),
        };
        let nudge_cooldown_secs =
            parsed_var("NUDGE_COOLDOWN_SECS").unwrap_or(DEFAULT_NUDGE_COOLDOWN_SECS);
        Ok(Self {
            database_url,
            jwt,
            nudge_cooldown_secs,
        })
    }
}
