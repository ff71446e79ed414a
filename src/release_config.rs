//! Per-branch release configuration.
//!
//! The configuration is a YAML document stored in the repository itself and
//! read from the pushed branch:
//!
//! ```yaml
//! file_path: app/__init__.py
//! version_pattern: __version__ = "$version"
//! ```

use serde::Deserialize;
use tracing::debug;

use crate::domain::pattern::{VersionPattern, DEFAULT_TEMPLATE};
use crate::error::{ReleaseError, Result};
use crate::host::ContentReader;

/// Repository path of the release configuration
pub const DEFAULT_CONFIG_PATH: &str = ".github/auto-release.yml";

/// Keys as written in the YAML document, before validation
#[derive(Debug, Default, Deserialize)]
struct RawReleaseConfig {
    #[serde(default)]
    file_path: Option<String>,

    #[serde(default)]
    version_pattern: Option<String>,
}

/// Validated release configuration
#[derive(Debug, Clone)]
pub struct ReleaseConfig {
    /// File holding the version marker
    pub file_path: String,
    pub version_pattern: VersionPattern,
}

impl ReleaseConfig {
    pub fn new(file_path: impl Into<String>, version_pattern: VersionPattern) -> Self {
        ReleaseConfig {
            file_path: file_path.into(),
            version_pattern,
        }
    }

    /// Parse and validate a YAML document.
    ///
    /// An empty document parses to defaults, which then fails validation
    /// because `file_path` has no default.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let raw = if text.trim().is_empty() {
            RawReleaseConfig::default()
        } else {
            serde_yaml::from_str::<Option<RawReleaseConfig>>(text)?.unwrap_or_default()
        };

        let file_path = raw
            .file_path
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ReleaseError::config("file_path is required"))?;

        let template = raw
            .version_pattern
            .unwrap_or_else(|| DEFAULT_TEMPLATE.to_string());
        let version_pattern = VersionPattern::new(template)?;

        Ok(ReleaseConfig {
            file_path,
            version_pattern,
        })
    }
}

/// Result of looking up the configuration on a branch
#[derive(Debug, Clone)]
pub enum ConfigLookup {
    Found(ReleaseConfig),
    /// No configuration file at the ref
    NotFound,
    /// The file exists but cannot be used; carries the reason
    Invalid(String),
}

/// Load the release configuration stored at `config_path` on `reference`.
///
/// # Returns
/// * `Ok(ConfigLookup)` - Found, absent or invalid configuration
/// * `Err` - The host failed to read the file
pub fn load_config<R: ContentReader + ?Sized>(
    reader: &R,
    config_path: &str,
    reference: &str,
) -> Result<ConfigLookup> {
    let file = match reader.read_file(config_path, reference)? {
        Some(file) => file,
        None => {
            debug!(config_path, reference, "release config not found");
            return Ok(ConfigLookup::NotFound);
        }
    };

    match ReleaseConfig::from_yaml(&file.content) {
        Ok(config) => Ok(ConfigLookup::Found(config)),
        Err(e @ (ReleaseError::Config(_) | ReleaseError::Pattern(_) | ReleaseError::Yaml(_))) => {
            Ok(ConfigLookup::Invalid(e.to_string()))
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;

    #[test]
    fn test_full_config() {
        let config = ReleaseConfig::from_yaml(
            "file_path: Cargo.toml\nversion_pattern: 'version = \"$version\"'\n",
        )
        .unwrap();
        assert_eq!(config.file_path, "Cargo.toml");
        assert_eq!(config.version_pattern.template(), "version = \"$version\"");
    }

    #[test]
    fn test_default_pattern() {
        let config = ReleaseConfig::from_yaml("file_path: app/__init__.py").unwrap();
        assert_eq!(config.version_pattern.template(), DEFAULT_TEMPLATE);
    }

    #[test]
    fn test_missing_file_path() {
        let err = ReleaseConfig::from_yaml("version_pattern: v$version").unwrap_err();
        assert!(err.to_string().contains("file_path is required"));
    }

    #[test]
    fn test_empty_document() {
        let err = ReleaseConfig::from_yaml("  \n").unwrap_err();
        assert!(matches!(err, ReleaseError::Config(_)));
    }

    #[test]
    fn test_blank_file_path() {
        assert!(ReleaseConfig::from_yaml("file_path: '  '").is_err());
    }

    #[test]
    fn test_pattern_without_placeholder() {
        let err =
            ReleaseConfig::from_yaml("file_path: a.py\nversion_pattern: nothing").unwrap_err();
        assert!(matches!(err, ReleaseError::Pattern(_)));
    }

    #[test]
    fn test_load_not_found() {
        let host = MemoryHost::new();
        let lookup = load_config(&host, DEFAULT_CONFIG_PATH, "issue-42").unwrap();
        assert!(matches!(lookup, ConfigLookup::NotFound));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let host = MemoryHost::new();
        host.put_file("issue-42", DEFAULT_CONFIG_PATH, "file_path: [unclosed");
        let lookup = load_config(&host, DEFAULT_CONFIG_PATH, "issue-42").unwrap();
        assert!(matches!(lookup, ConfigLookup::Invalid(_)));
    }

    #[test]
    fn test_load_found() {
        let host = MemoryHost::new();
        host.put_file("issue-42", DEFAULT_CONFIG_PATH, "file_path: app/__init__.py\n");
        match load_config(&host, DEFAULT_CONFIG_PATH, "refs/heads/issue-42").unwrap() {
            ConfigLookup::Found(config) => assert_eq!(config.file_path, "app/__init__.py"),
            other => panic!("unexpected lookup: {:?}", other),
        }
    }
}
