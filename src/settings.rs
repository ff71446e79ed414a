use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::command::DEFAULT_PREFIX;
use crate::error::Result;
use crate::release_config::DEFAULT_CONFIG_PATH;

/// Settings file looked up in the working directory
pub const SETTINGS_FILE: &str = "auto-release.toml";

/// Process-level settings for auto-release.
///
/// Controls how directives are recognised, where the per-branch release config
/// lives, who authors generated commits and tags, and how logs are emitted.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,

    #[serde(default = "default_config_path")]
    pub config_path: String,

    #[serde(default)]
    pub committer: Committer,

    #[serde(default)]
    pub logging: LoggingSettings,
}

fn default_command_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_config_path() -> String {
    DEFAULT_CONFIG_PATH.to_string()
}

/// Identity used for generated commits and tags
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Committer {
    #[serde(default = "default_committer_name")]
    pub name: String,

    #[serde(default = "default_committer_email")]
    pub email: String,
}

fn default_committer_name() -> String {
    "auto-release".to_string()
}

fn default_committer_email() -> String {
    "auto-release@localhost".to_string()
}

impl Default for Committer {
    fn default() -> Self {
        Committer {
            name: default_committer_name(),
            email: default_committer_email(),
        }
    }
}

/// Log output options
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit newline-delimited JSON instead of text
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            command_prefix: default_command_prefix(),
            config_path: default_config_path(),
            committer: Committer::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Settings {
    /// Parse settings from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Loads settings from file or returns defaults.
///
/// Attempts to load settings in the following order:
/// 1. Custom path provided as parameter
/// 2. `auto-release.toml` in current directory
/// 3. `auto-release.toml` in user config directory
/// 4. Default settings if no file found
///
/// # Returns
/// * `Ok(Settings)` - Loaded or default settings
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_settings(settings_path: Option<&str>) -> Result<Settings> {
    let settings_str = if let Some(path) = settings_path {
        fs::read_to_string(path)?
    } else if Path::new(SETTINGS_FILE).exists() {
        fs::read_to_string(SETTINGS_FILE)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let settings_path = config_dir.join(SETTINGS_FILE);
        if settings_path.exists() {
            fs::read_to_string(settings_path)?
        } else {
            return Ok(Settings::default());
        }
    } else {
        return Ok(Settings::default());
    };

    Settings::from_toml(&settings_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.command_prefix, "release");
        assert_eq!(settings.config_path, ".github/auto-release.yml");
        assert_eq!(settings.committer.name, "auto-release");
        assert_eq!(settings.logging.level, "info");
        assert!(!settings.logging.json);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings = Settings::from_toml(
            r#"
command_prefix = "bump"

[committer]
email = "bot@example.com"
"#,
        )
        .unwrap();
        assert_eq!(settings.command_prefix, "bump");
        assert_eq!(settings.config_path, DEFAULT_CONFIG_PATH);
        assert_eq!(settings.committer.name, "auto-release");
        assert_eq!(settings.committer.email, "bot@example.com");
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Settings::from_toml("").unwrap(), Settings::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = Settings::from_toml("command_prefix = [").unwrap_err();
        assert!(err.to_string().contains("Invalid settings file"));
    }
}
