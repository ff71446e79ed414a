//! Release directive extraction from commit messages.
//!
//! A directive is written inline as `[prefix:value]`, e.g. `[release:1.2.0]`.
//! Every message is scanned in order and the last directive seen wins, so a
//! directive in an earlier commit survives later commits that carry none.

use regex::Regex;

use crate::error::{ReleaseError, Result};

/// Default directive prefix
pub const DEFAULT_PREFIX: &str = "release";

/// Compiled matcher for one directive prefix.
#[derive(Debug, Clone)]
pub struct CommandMatcher {
    regex: Regex,
}

impl CommandMatcher {
    /// Build a matcher for `[prefix:value]`. The prefix is matched literally
    /// and case-sensitively.
    pub fn new(prefix: &str) -> Result<Self> {
        if prefix.is_empty() {
            return Err(ReleaseError::config("Command prefix cannot be empty"));
        }
        let pattern = format!(r"\[{}:(.+?)\]", regex::escape(prefix));
        let regex = Regex::new(&pattern)
            .map_err(|e| ReleaseError::pattern(format!("Invalid command pattern: {}", e)))?;
        Ok(CommandMatcher { regex })
    }

    /// All non-empty directive values in one message, trimmed, in order of
    /// occurrence.
    pub fn find_all<'a>(&'a self, message: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.regex
            .captures_iter(message)
            .filter_map(|captures| captures.get(1))
            .map(|m| m.as_str().trim())
            .filter(|value| !value.is_empty())
    }

    /// The effective directive across an ordered list of messages.
    pub fn extract<I, S>(&self, messages: I) -> Option<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut last = None;
        for message in messages {
            if let Some(value) = self.find_all(message.as_ref()).last() {
                last = Some(value.to_string());
            }
        }
        last
    }
}

/// Extract the last `[prefix:value]` directive from `messages`.
///
/// Returns `None` when no message carries a directive or the prefix cannot
/// form a pattern.
pub fn extract_command<S: AsRef<str>>(messages: &[S], prefix: &str) -> Option<String> {
    CommandMatcher::new(prefix).ok()?.extract(messages)
}
