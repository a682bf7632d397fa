//! Configuration loading: env beats file beats defaults.

use std::path::{Path, PathBuf};

use crate::env::apply_env_overrides;
use crate::schema::{ConfigError, ErpConfig};

/// Loads configuration for a run: starts from defaults, layers in
/// `path` if it exists, then applies `ERP_FORENSICS_*` environment
/// overrides.
pub fn load_config(path: Option<&Path>) -> Result<ErpConfig, ConfigError> {
    let mut config = match path {
        Some(path) if path.exists() => load_from_file(path)?,
        _ => ErpConfig::default(),
    };
    apply_env_overrides(&mut config)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn load_from_file(path: &Path) -> Result<ErpConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
}

/// Default config file path: `$HOME/.erp-forensics/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| Path::new(&home).join(".erp-forensics").join("config.toml"))
}

pub fn validate_config(config: &ErpConfig) -> Result<(), ConfigError> {
    if config.concurrency == 0 {
        return Err(ConfigError::Validation("concurrency must be at least 1".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RunMode;
    use std::io::Write;

    #[test]
    fn loads_defaults_when_no_file_given() {
        let config = load_config(None).unwrap();
        assert_eq!(config.concurrency, 5);
        assert_eq!(config.mode, RunMode::Offline);
    }

    #[test]
    fn loads_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "mode = \"live\"\nconcurrency = 8").unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.mode, RunMode::Live);
        assert_eq!(config.concurrency, 8);
    }

    #[test]
    fn rejects_zero_concurrency() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "concurrency = 0").unwrap();
        assert!(load_config(Some(file.path())).is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_config(Some(Path::new("/nonexistent/path/config.toml"))).unwrap();
        assert_eq!(config.concurrency, 5);
    }
}
