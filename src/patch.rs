//! Version propagation into the tracked file.
//!
//! The released version is read from the default branch. The pushed branch
//! receives the default branch's file with that version replaced by the
//! requested one, unless it already holds exactly that content.

use tracing::{debug, info};

use crate::error::ReleaseError;
use crate::host::{ContentReader, ContentWriter, FileUpdate};
use crate::outcome::ReleaseFailure;
use crate::release_config::ReleaseConfig;

/// Planned change to the version file on the pushed branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionPatch {
    pub path: String,
    /// Content on the default branch
    pub original_content: String,
    /// Content on the pushed branch
    pub current_content: String,
    pub new_content: String,
    /// Version found on the default branch
    pub current_version: String,
    pub new_version: String,
    /// Content hash of `current_content`, the write token
    pub current_sha: String,
    /// Always `new_content != current_content`
    pub changed: bool,
}

impl VersionPatch {
    /// Replace every occurrence of `current_version` in `original_content`.
    ///
    /// Replacement is plain substring replacement.
    pub fn new(
        path: impl Into<String>,
        original_content: impl Into<String>,
        current_content: impl Into<String>,
        current_sha: impl Into<String>,
        current_version: impl Into<String>,
        new_version: impl Into<String>,
    ) -> Self {
        let original_content = original_content.into();
        let current_content = current_content.into();
        let current_version = current_version.into();
        let new_version = new_version.into();

        let new_content = original_content.replace(&current_version, &new_version);
        let changed = new_content != current_content;

        VersionPatch {
            path: path.into(),
            original_content,
            current_content,
            new_content,
            current_version,
            new_version,
            current_sha: current_sha.into(),
            changed,
        }
    }

    /// Commit message for writing this patch
    pub fn commit_message(&self) -> String {
        format!("Release {}", self.new_version)
    }
}

fn host_failure(action: String, err: ReleaseError) -> ReleaseFailure {
    ReleaseFailure::Host {
        action,
        detail: err.to_string(),
    }
}

/// Compute the patch for `reference` without writing anything.
///
/// Reads `config.file_path` from `default_branch` to find the released
/// version, then from `reference` as the baseline for the comparison.
pub fn compute_patch<R: ContentReader + ?Sized>(
    reader: &R,
    default_branch: &str,
    reference: &str,
    config: &ReleaseConfig,
    new_version: &str,
) -> Result<VersionPatch, ReleaseFailure> {
    let path = config.file_path.as_str();

    let original = reader
        .read_file(path, default_branch)
        .map_err(|e| host_failure(format!("read {} on {}", path, default_branch), e))?
        .ok_or_else(|| ReleaseFailure::SourceFileMissing {
            path: path.to_string(),
            branch: default_branch.to_string(),
        })?;

    let current_version = config
        .version_pattern
        .find_version(&original.content)
        .ok_or_else(|| ReleaseFailure::PatternNotFound {
            path: path.to_string(),
            pattern: config.version_pattern.template().to_string(),
        })?
        .to_string();
    debug!(path, %current_version, "found released version");

    let current = reader
        .read_file(path, reference)
        .map_err(|e| host_failure(format!("read {} on {}", path, reference), e))?
        .ok_or_else(|| ReleaseFailure::TargetFileMissing {
            path: path.to_string(),
            branch: reference.to_string(),
        })?;

    Ok(VersionPatch::new(
        path,
        original.content,
        current.content,
        current.sha,
        current_version,
        new_version,
    ))
}

/// Write a changed patch to `branch`.
///
/// # Returns
/// * `Ok(Some(commit))` - The file was updated by `commit`
/// * `Ok(None)` - Nothing to write, the branch is already current
/// * `Err` - The write was rejected
pub fn apply_patch<W: ContentWriter + ?Sized>(
    writer: &W,
    branch: &str,
    patch: &VersionPatch,
) -> Result<Option<String>, ReleaseFailure> {
    if !patch.changed {
        debug!(path = %patch.path, branch, "version file already current");
        return Ok(None);
    }

    let message = patch.commit_message();
    let update = FileUpdate {
        path: &patch.path,
        branch,
        message: &message,
        content: &patch.new_content,
        expected_sha: &patch.current_sha,
    };

    match writer.update_file(&update) {
        Ok(commit) => {
            info!(path = %patch.path, branch, %commit, "updated version file");
            Ok(Some(commit))
        }
        Err(ReleaseError::Conflict(detail)) => Err(ReleaseFailure::WriteConflict {
            path: patch.path.clone(),
            branch: branch.to_string(),
            detail,
        }),
        Err(e) => Err(host_failure(format!("update {} on {}", patch.path, branch), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pattern::{VersionPattern, DEFAULT_TEMPLATE};
    use crate::host::MemoryHost;

    fn config() -> ReleaseConfig {
        ReleaseConfig::new(
            "app/__init__.py",
            VersionPattern::new(DEFAULT_TEMPLATE).unwrap(),
        )
    }

    #[test]
    fn test_patch_replaces_version() {
        let patch = VersionPatch::new(
            "a.py",
            "__version__ = \"0.1\"",
            "__version__ = \"0.1\"",
            "sha",
            "0.1",
            "0.2",
        );
        assert_eq!(patch.new_content, "__version__ = \"0.2\"");
        assert!(patch.changed);
        assert_eq!(patch.commit_message(), "Release 0.2");
    }

    #[test]
    fn test_patch_replaces_every_occurrence() {
        let patch = VersionPatch::new("a", "0.1 and 0.1", "x", "sha", "0.1", "0.2");
        assert_eq!(patch.new_content, "0.2 and 0.2");
    }

    #[test]
    fn test_patch_unchanged_when_current() {
        let patch = VersionPatch::new(
            "a.py",
            "__version__ = \"0.1\"",
            "__version__ = \"0.2\"",
            "sha",
            "0.1",
            "0.2",
        );
        assert!(!patch.changed);
    }

    #[test]
    fn test_compute_reads_base_then_branch() {
        let host = MemoryHost::new();
        host.put_file("master", "app/__init__.py", "__version__ = \"0.1\"\n");
        host.put_file("issue-42", "app/__init__.py", "__version__ = \"0.1\"\n");

        let patch = compute_patch(&host, "master", "issue-42", &config(), "0.2").unwrap();
        assert_eq!(patch.current_version, "0.1");
        assert_eq!(patch.new_content, "__version__ = \"0.2\"\n");
        assert!(patch.changed);

        let reads: Vec<String> = host.reads().into_iter().map(|(_, r)| r).collect();
        assert_eq!(reads, vec!["master".to_string(), "issue-42".to_string()]);
    }

    #[test]
    fn test_compute_missing_base_file() {
        let host = MemoryHost::new();
        let err = compute_patch(&host, "master", "issue-42", &config(), "0.2").unwrap_err();
        assert!(matches!(err, ReleaseFailure::SourceFileMissing { .. }));
    }

    #[test]
    fn test_compute_pattern_not_found() {
        let host = MemoryHost::new();
        host.put_file("master", "app/__init__.py", "VERSION = 1\n");
        let err = compute_patch(&host, "master", "issue-42", &config(), "0.2").unwrap_err();
        assert!(matches!(err, ReleaseFailure::PatternNotFound { .. }));
        assert_eq!(host.reads().len(), 1);
    }

    #[test]
    fn test_compute_missing_branch_file() {
        let host = MemoryHost::new();
        host.put_file("master", "app/__init__.py", "__version__ = \"0.1\"\n");
        let err = compute_patch(&host, "master", "issue-42", &config(), "0.2").unwrap_err();
        assert!(matches!(err, ReleaseFailure::TargetFileMissing { .. }));
    }

    #[test]
    fn test_apply_skips_unchanged() {
        let host = MemoryHost::new();
        let patch = VersionPatch::new("a", "v1", "v2", "sha", "1", "2");
        assert!(!patch.changed);
        assert_eq!(apply_patch(&host, "dev", &patch).unwrap(), None);
        assert!(host.writes().is_empty());
    }

    #[test]
    fn test_apply_conflict() {
        let host = MemoryHost::new();
        host.put_file("dev", "a", "v1");
        let patch = VersionPatch::new("a", "v1", "v1", "stale", "1", "2");
        let err = apply_patch(&host, "dev", &patch).unwrap_err();
        assert!(matches!(err, ReleaseFailure::WriteConflict { .. }));
    }
}
