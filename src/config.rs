use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Shared admin password. `None` disables admin login.
    pub admin_password: Option<String>,
    pub session_ttl_secs: u64,
    /// Marks the session cookie `Secure` (production deployments behind TLS).
    pub secure_cookies: bool,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DATABASE_URL")
                .or_else(|_| std::env::var("DB_URL"))
                .map_err(|_| {
                    anyhow::anyhow!("DATABASE_URL or DB_URL environment variable required")
                })
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("DATABASE_URL cannot be empty");
                    }
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            admin_password: std::env::var("ADMIN_PASSWORD")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            session_ttl_secs: parse_positive("SESSION_TTL_SECS", 86_400)?,
            secure_cookies: std::env::var("APP_ENV")
                .map(|env| env.eq_ignore_ascii_case("production"))
                .unwrap_or(false),
            rate_limit_per_second: parse_positive("RATE_LIMIT_PER_SECOND", 10)?,
            rate_limit_burst: u32::try_from(parse_positive("RATE_LIMIT_BURST", 20)?)
                .map_err(|_| anyhow::anyhow!("RATE_LIMIT_BURST is too large"))?,
        };

        if config.admin_password.is_none() {
            tracing::warn!("ADMIN_PASSWORD not set - admin login is disabled");
        }

        tracing::debug!(
            "Database URL: {}...",
            &config.database_url[..20.min(config.database_url.len())]
        );
        tracing::debug!("Server Port: {}", config.port);
        tracing::debug!(
            "Rate limit: {}/s (burst {}), session TTL {}s, secure cookies: {}",
            config.rate_limit_per_second,
            config.rate_limit_burst,
            config.session_ttl_secs,
            config.secure_cookies
        );

        Ok(config)
    }
}

/// Reads a strictly positive integer variable, falling back when unset.
fn parse_positive(name: &str, default: u64) -> anyhow::Result<u64> {
    let Ok(raw) = std::env::var(name) else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => anyhow::bail!("{} must be a positive integer, got '{}'", name, raw),
    }
}
