mod types;

pub use types::{MirrorConfig, OutputConfig, ScalarOverrides, SchemaSource, ServerConfig};

use crate::error::{MirrorError, Result};
use config::{Config, Environment};
use std::fs;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "gqlmirror.toml";

/// Prefix of environment variables overriding file settings (`GQLMIRROR__SERVER__PORT`)
pub const ENV_PREFIX: &str = "GQLMIRROR";

/// Load configuration from a TOML file, then apply environment overrides
pub fn load_config(path: &str) -> Result<MirrorConfig> {
    load_config_with_env(path, environment())
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
}

fn load_config_with_env(path: &str, env: Environment) -> Result<MirrorConfig> {
    let contents = fs::read_to_string(path)
        .map_err(|e| MirrorError::Config(format!("Failed to read config file '{}': {}", path, e)))?;

    let mut config: MirrorConfig = toml::from_str(&contents)?;
    apply_env_overrides(&mut config, env)?;

    config.validate().map_err(MirrorError::Config)?;

    Ok(config)
}

/// Override the schema source and server settings from the environment
///
/// Only these keys are read from the environment; everything else, in
/// particular case-sensitive scalar names, comes from the file alone.
fn apply_env_overrides(config: &mut MirrorConfig, env: Environment) -> Result<()> {
    let overrides = Config::builder().add_source(env).build()?;

    if let Ok(url) = overrides.get_string("schema.url") {
        tracing::debug!("Schema url overridden from environment");
        config.schema.url = Some(url);
        config.schema.path = None;
    }
    if let Ok(path) = overrides.get_string("schema.path") {
        tracing::debug!("Schema path overridden from environment");
        config.schema.path = Some(path);
        config.schema.url = None;
    }
    if let Ok(port) = overrides.get_int("server.port") {
        config.server.port = u16::try_from(port)
            .map_err(|_| MirrorError::Config(format!("{}__SERVER__PORT: {} is not a valid port", ENV_PREFIX, port)))?;
    }
    if let Ok(bind) = overrides.get_string("server.bind") {
        config.server.bind = bind;
    }

    Ok(())
}

/// Save configuration to a TOML file
pub fn save_config(config: &MirrorConfig, path: &str) -> Result<()> {
    config.validate().map_err(MirrorError::Config)?;

    let toml_string = toml::to_string_pretty(config)?;
    fs::write(path, toml_string)
        .map_err(|e| MirrorError::Config(format!("Failed to write config file '{}': {}", path, e)))?;

    Ok(())
}
