//! Environment variable overrides, applied on top of a file-loaded (or
//! default) [`ErpConfig`]. Prefix: `ERP_FORENSICS_`.
//!
//! Format: `ERP_FORENSICS_<KEY>`, e.g. `ERP_FORENSICS_CONCURRENCY=8`,
//! `ERP_FORENSICS_MODE=live`, `ERP_FORENSICS_LOG_LEVEL=debug`.

use std::env;

use crate::schema::{ConfigError, ErpConfig, RunMode};

pub fn apply_env_overrides(config: &mut ErpConfig) -> Result<(), ConfigError> {
    if let Ok(mode) = env::var("ERP_FORENSICS_MODE") {
        config.mode = match mode.to_lowercase().as_str() {
            "live" => RunMode::Live,
            "offline" => RunMode::Offline,
            other => return Err(ConfigError::Validation(format!("unknown mode: {other}"))),
        };
    }

    if let Ok(concurrency) = env::var("ERP_FORENSICS_CONCURRENCY") {
        config.concurrency = concurrency
            .parse()
            .map_err(|_| ConfigError::Validation(format!("invalid concurrency: {concurrency}")))?;
    }

    if let Ok(modules) = env::var("ERP_FORENSICS_MODULES") {
        config.modules = modules
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }

    if let Ok(checkpoint) = env::var("ERP_FORENSICS_CHECKPOINT_ENABLED") {
        config.checkpoint.enabled = matches!(checkpoint.to_lowercase().as_str(), "1" | "true" | "yes");
    }

    if let Ok(namespace) = env::var("ERP_FORENSICS_CHECKPOINT_NAMESPACE") {
        config.checkpoint.namespace = namespace;
    }

    if let Ok(log_level) = env::var("ERP_FORENSICS_LOG_LEVEL") {
        config.log_level = log_level;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn overrides_concurrency_and_mode() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var("ERP_FORENSICS_MODE", "live");
        env::set_var("ERP_FORENSICS_CONCURRENCY", "12");
        let mut config = ErpConfig::default();
        apply_env_overrides(&mut config).unwrap();
        assert_eq!(config.mode, RunMode::Live);
        assert_eq!(config.concurrency, 12);
        env::remove_var("ERP_FORENSICS_MODE");
        env::remove_var("ERP_FORENSICS_CONCURRENCY");
    }

    #[test]
    fn rejects_unknown_mode() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var("ERP_FORENSICS_MODE", "nonsense");
        let mut config = ErpConfig::default();
        assert!(apply_env_overrides(&mut config).is_err());
        env::remove_var("ERP_FORENSICS_MODE");
    }
}
