//! Configuration loading (spec §9 ambient configuration): mode,
//! concurrency, module allow-list, checkpoint settings, and log level,
//! layered as env > TOML file > defaults.

pub mod config;
pub mod env;
pub mod schema;

pub use config::{default_config_path, load_config, load_from_file, validate_config};
pub use env::apply_env_overrides;
pub use schema::{CheckpointSection, ConfigError, ErpConfig, RunMode};
