use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub db_max_connections: u32,
    /// Rendering DPI used to derive page geometry in CSS pixels.
    pub page_dpi: f32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: optional_env("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
            db_max_connections: optional_env("DB_MAX_CONNECTIONS", "10")
                .parse::<u32>()
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
            page_dpi: parse_dpi(&optional_env("PAGE_DPI", "96"))?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_dpi(raw: &str) -> Result<f32> {
    let dpi = raw
        .trim()
        .parse::<f32>()
        .context("PAGE_DPI must be a number")?;
    anyhow::ensure!(
        dpi.is_finite() && dpi > 0.0,
        "PAGE_DPI must be positive, got {dpi}"
    );
    Ok(dpi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dpi_accepts_positive_numbers() {
        assert_eq!(parse_dpi(" 72 ").unwrap(), 72.0);
        assert!(parse_dpi("0").is_err());
        assert!(parse_dpi("dpi").is_err());
    }
}
