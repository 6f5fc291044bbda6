use crate::config::types::Config;
use crate::config::validation::clamp_limits;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// A missing file is not an error: the built-in defaults are used and a
/// warning is logged. Malformed TOML is an error. All limits are clamped to
/// their usable floor before the config is returned.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Loaded (or default) configuration with clamped limits
/// * `Err(ConfigError)` - The file exists but could not be read or parsed
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)?
    } else {
        tracing::warn!(
            "Config file '{}' not found. Using default configuration.",
            path.display()
        );
        Config::default()
    };

    clamp_limits(&mut config);

    Ok(config)
}
