use anyhow::{Result, bail};

use super::AppConfig;

pub fn validate(cfg: &AppConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    if let Some(database) = cfg.database.as_ref() {
        if database.url.trim().is_empty() {
            errors.push("database.url must not be empty".to_string());
        }

        if database.min_idle > database.max_connections {
            errors.push(format!(
                "database.min_idle ({}) must be <= database.max_connections ({})",
                database.min_idle, database.max_connections
            ));
        }
    }

    if cfg.tokens.private_key_path.trim().is_empty() {
        errors.push("tokens.private_key_path must not be empty".to_string());
    }

    if cfg.tokens.public_key_path.trim().is_empty() {
        errors.push("tokens.public_key_path must not be empty".to_string());
    }

    if cfg.tokens.access_ttl_secs <= 0 {
        errors.push("tokens.access_ttl_secs must be > 0".to_string());
    }

    if cfg.tokens.refresh_ttl_days <= 0 {
        errors.push("tokens.refresh_ttl_days must be > 0".to_string());
    }

    if cfg.tokens.access_ttl_secs >= cfg.tokens.refresh_ttl_days * 24 * 3600 {
        errors.push(
            "tokens.access_ttl_secs must be shorter than the refresh lifetime".to_string(),
        );
    }

    if cfg.sessions.max_per_principal == 0 {
        errors.push("sessions.max_per_principal must be > 0".to_string());
    }

    if cfg.sessions.cleanup_interval_secs == 0 {
        errors.push("sessions.cleanup_interval_secs must be > 0".to_string());
    }

    if cfg.cache.max_entries == 0 {
        errors.push("cache.max_entries must be > 0".to_string());
    }

    if let Some(url) = cfg.cache.redis_url.as_ref() {
        if url.trim().is_empty() {
            errors.push("cache.redis_url must not be empty when set".to_string());
        }
    }

    if errors.is_empty() {
        return Ok(());
    }

    bail!("invalid app config:\n- {}", errors.join("\n- "))
}
