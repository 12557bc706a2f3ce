//! Configuration validation
//!
//! Checks run once at startup. Any failure stops the process before it binds
//! a port.

use anyhow::Result;
use pictier_core::Config;

pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() && config.cors_origins.iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production. \
            Set specific allowed origins via CORS_ORIGINS."
        ));
    }

    if config.db_max_connections == 0 {
        return Err(anyhow::anyhow!("Database max connections cannot be 0"));
    }

    if !config.media_base_url.starts_with("http://") && !config.media_base_url.starts_with("https://") {
        return Err(anyhow::anyhow!(
            "MEDIA_BASE_URL must be an absolute http(s) URL, got '{}'",
            config.media_base_url
        ));
    }

    if config.is_production() && config.public_base_url.starts_with("http://localhost") {
        tracing::warn!(
            public_base_url = %config.public_base_url,
            "PUBLIC_BASE_URL points at localhost in production; expiring links will not be reachable"
        );
    }

    Ok(())
}
