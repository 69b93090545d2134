use std::env;

use crate::infrastructure::security::DEFAULT_TOKEN_TTL_SECS;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    /// Empty means any origin is allowed.
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid PORT: {}", e))?;
        let database_url =
            env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?;
        if jwt_secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }
        let token_ttl_secs = match env::var("TOKEN_TTL_SECS") {
            Ok(raw) => parse_ttl(&raw)?,
            Err(_) => DEFAULT_TOKEN_TTL_SECS,
        };
        let cors_origins = parse_origins(&env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".into()));

        Ok(Self {
            host,
            port,
            database_url,
            jwt_secret,
            token_ttl_secs,
            cors_origins,
        })
    }
}

fn parse_ttl(raw: &str) -> anyhow::Result<i64> {
    let secs: i64 = raw
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid TOKEN_TTL_SECS: {}", e))?;
    if secs <= 0 {
        anyhow::bail!("TOKEN_TTL_SECS must be positive");
    }
    Ok(secs)
}

/// Splits a comma-separated origin list. A lone `*` allows any origin.
pub fn parse_origins(raw: &str) -> Vec<String> {
    if raw.trim() == "*" {
        return Vec::new();
    }
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && s != "*")
        .collect()
}
