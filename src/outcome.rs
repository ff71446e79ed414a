use std::fmt;

/// Reportable reasons a release could not be completed.
///
/// These end the handling of one event with a failure status; they are never
/// process faults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseFailure {
    /// No release configuration on the pushed branch
    ConfigMissing { path: String, branch: String },
    /// The release configuration exists but cannot be used
    ConfigInvalid { path: String, reason: String },
    /// The versioned file does not exist on the default branch
    SourceFileMissing { path: String, branch: String },
    /// The versioned file does not exist on the pushed branch
    TargetFileMissing { path: String, branch: String },
    /// The version pattern does not match the default branch's file
    PatternNotFound { path: String, pattern: String },
    /// The pushed branch changed between read and write
    WriteConflict {
        path: String,
        branch: String,
        detail: String,
    },
    /// Any other host failure
    Host { action: String, detail: String },
}

impl ReleaseFailure {
    /// Short status title for this failure
    pub fn title(&self) -> &'static str {
        match self {
            ReleaseFailure::ConfigMissing { .. } => "Release config not found",
            ReleaseFailure::ConfigInvalid { .. } => "Invalid release config",
            ReleaseFailure::SourceFileMissing { .. } => "Version file not found",
            ReleaseFailure::TargetFileMissing { .. } => "Version file not found on branch",
            ReleaseFailure::PatternNotFound { .. } => "Version pattern not found",
            ReleaseFailure::WriteConflict { .. } => "Version file changed concurrently",
            ReleaseFailure::Host { .. } => "Release failed",
        }
    }
}

impl fmt::Display for ReleaseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseFailure::ConfigMissing { path, branch } => {
                write!(f, "No release config '{}' found on '{}'", path, branch)
            }
            ReleaseFailure::ConfigInvalid { path, reason } => {
                write!(f, "Release config '{}' is invalid: {}", path, reason)
            }
            ReleaseFailure::SourceFileMissing { path, branch } => {
                write!(f, "File '{}' not found on base branch '{}'", path, branch)
            }
            ReleaseFailure::TargetFileMissing { path, branch } => {
                write!(f, "File '{}' not found on branch '{}'", path, branch)
            }
            ReleaseFailure::PatternNotFound { path, pattern } => {
                write!(f, "Pattern '{}' not found in '{}'", pattern, path)
            }
            ReleaseFailure::WriteConflict {
                path,
                branch,
                detail,
            } => write!(
                f,
                "Could not update '{}' on '{}': {}",
                path, branch, detail
            ),
            ReleaseFailure::Host { action, detail } => {
                write!(f, "Failed to {}: {}", action, detail)
            }
        }
    }
}

/// Terminal state of handling one push event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// No directive in the pushed commits
    NoDirective,
    /// Tag and release created on the default branch
    Released { tag: String },
    /// Version file updated on the pushed branch
    Written {
        version: String,
        path: String,
        commit: String,
    },
    /// Version file already carries the requested version
    AlreadyCurrent { version: String, path: String },
    Failed(ReleaseFailure),
}

impl ReleaseOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, ReleaseOutcome::Failed(_))
    }

    pub fn failure(&self) -> Option<&ReleaseFailure> {
        match self {
            ReleaseOutcome::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

impl From<ReleaseFailure> for ReleaseOutcome {
    fn from(failure: ReleaseFailure) -> Self {
        ReleaseOutcome::Failed(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_invalid_config_are_distinct() {
        let missing = ReleaseFailure::ConfigMissing {
            path: ".github/auto-release.yml".to_string(),
            branch: "issue-42".to_string(),
        };
        let invalid = ReleaseFailure::ConfigInvalid {
            path: ".github/auto-release.yml".to_string(),
            reason: "file_path is required".to_string(),
        };
        assert_ne!(missing.title(), invalid.title());
        assert!(missing.to_string().contains("No release config"));
        assert!(invalid.to_string().contains("file_path is required"));
    }

    #[test]
    fn test_pattern_not_found_display() {
        let failure = ReleaseFailure::PatternNotFound {
            path: "app/__init__.py".to_string(),
            pattern: "__version__ = \"$version\"".to_string(),
        };
        let msg = failure.to_string();
        assert!(msg.contains("app/__init__.py"), "got: {}", msg);
        assert!(msg.contains("$version"), "got: {}", msg);
    }

    #[test]
    fn test_outcome_success() {
        assert!(ReleaseOutcome::NoDirective.is_success());
        assert!(ReleaseOutcome::AlreadyCurrent {
            version: "1".to_string(),
            path: "a".to_string()
        }
        .is_success());

        let failed: ReleaseOutcome = ReleaseFailure::Host {
            action: "create release".to_string(),
            detail: "boom".to_string(),
        }
        .into();
        assert!(!failed.is_success());
        assert_eq!(failed.failure().unwrap().title(), "Release failed");
    }
}
