use regex::Regex;

use crate::error::{ReleaseError, Result};

/// Placeholder standing for the version inside a pattern template
pub const PLACEHOLDER: &str = "$version";

/// Matches `${version}` or a `$version` not followed by an identifier character
const PLACEHOLDER_PATTERN: &str = r"\$\{version\}|\$version\b";

/// Capture group substituted for the placeholder
const VERSION_CAPTURE: &str = "(?P<version>.+?)";

/// Template used when the release config does not set `version_pattern`
pub const DEFAULT_TEMPLATE: &str = r#"__version__ = "$version""#;

/// Version locator built from a template such as `__version__ = "$version"`.
///
/// The template is a regular expression in which the placeholder becomes a
/// non-greedy capture of one or more characters.
#[derive(Debug, Clone)]
pub struct VersionPattern {
    template: String,
    regex: Regex,
}

impl VersionPattern {
    /// Compile a template. It must contain exactly one placeholder.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        let placeholder = Regex::new(PLACEHOLDER_PATTERN)
            .map_err(|e| ReleaseError::pattern(format!("Invalid placeholder pattern: {}", e)))?;

        let found: Vec<_> = placeholder.find_iter(&template).collect();
        let [slot] = found.as_slice() else {
            return Err(ReleaseError::pattern(format!(
                "Pattern '{}' must contain exactly one {} placeholder",
                template, PLACEHOLDER
            )));
        };

        let rendered = format!(
            "{}{}{}",
            &template[..slot.start()],
            VERSION_CAPTURE,
            &template[slot.end()..]
        );
        let regex = Regex::new(&rendered)
            .map_err(|e| ReleaseError::pattern(format!("Invalid pattern '{}': {}", template, e)))?;

        Ok(VersionPattern { template, regex })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// The version captured by the first match in `content`, if any
    pub fn find_version<'c>(&self, content: &'c str) -> Option<&'c str> {
        self.regex
            .captures(content)
            .and_then(|captures| captures.name("version"))
            .map(|m| m.as_str())
    }
}
