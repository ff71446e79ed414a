//! Push event handling
//!
//! [ReleaseEngine::handle_push] runs one push event through the whole release
//! decision:
//!
//! 1. Extract the release directive from the pushed commits
//! 2. Pushes to the default branch create a tag and release
//! 3. Other pushes load the release config from the pushed branch
//! 4. Compute the version patch against the default branch
//! 5. Write the patch when the pushed branch is not already current
//!
//! Every step reports progress through a [StatusReporter]. Failures end in a
//! failure status and a [ReleaseOutcome::Failed]; nothing is propagated.

use tracing::{info, warn};

use crate::command::CommandMatcher;
use crate::domain::{BranchPolicy, PushEvent};
use crate::error::Result;
use crate::host::{Host, ReleaseRequest};
use crate::outcome::{ReleaseFailure, ReleaseOutcome};
use crate::patch::{apply_patch, compute_patch};
use crate::release_config::{load_config, ConfigLookup, ReleaseConfig};
use crate::settings::Settings;
use crate::status::{emit, StatusReporter, StatusUpdate};

/// Decides and performs the release action for push events
#[derive(Debug, Clone)]
pub struct ReleaseEngine {
    prefix: String,
    matcher: CommandMatcher,
    config_path: String,
}

impl ReleaseEngine {
    pub fn new(prefix: &str, config_path: impl Into<String>) -> Result<Self> {
        Ok(ReleaseEngine {
            prefix: prefix.to_string(),
            matcher: CommandMatcher::new(prefix)?,
            config_path: config_path.into(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(&settings.command_prefix, settings.config_path.clone())
    }

    /// The effective directive of an event, if any
    pub fn directive(&self, event: &PushEvent) -> Option<String> {
        self.matcher.extract(event.messages())
    }

    /// Handle one push event end to end.
    pub fn handle_push<H, S>(&self, event: &PushEvent, host: &H, reporter: &mut S) -> ReleaseOutcome
    where
        H: Host + ?Sized,
        S: StatusReporter + ?Sized,
    {
        info!(
            repository = %event.repository.full_name,
            reference = %event.reference,
            commits = event.commits.len(),
            "handling push"
        );
        emit(
            reporter,
            StatusUpdate::in_progress(
                "Checking for release command",
                format!(
                    "Looking for [{}:...] in {} commit(s)",
                    self.prefix,
                    event.commits.len()
                ),
            ),
        );

        let version = match self.directive(event) {
            Some(version) => version,
            None => {
                info!("no release command found");
                emit(
                    reporter,
                    StatusUpdate::success("No release command", "Nothing to release"),
                );
                return ReleaseOutcome::NoDirective;
            }
        };

        info!(%version, "release command found");
        emit(
            reporter,
            StatusUpdate::in_progress(
                format!("Releasing {}", version),
                format!("Release command found on '{}'", event.branch()),
            ),
        );

        let result = match BranchPolicy::resolve(&event.reference, event.default_branch()) {
            BranchPolicy::Release => self.release(event, host, &version),
            BranchPolicy::Propagation => self.propagate(event, host, &version),
        };

        match result {
            Ok((outcome, update)) => {
                emit(reporter, update);
                outcome
            }
            Err(failure) => {
                warn!(%failure, "release failed");
                emit(
                    reporter,
                    StatusUpdate::failure(failure.title(), failure.to_string()),
                );
                ReleaseOutcome::Failed(failure)
            }
        }
    }

    fn release<H: Host + ?Sized>(
        &self,
        event: &PushEvent,
        host: &H,
        version: &str,
    ) -> std::result::Result<(ReleaseOutcome, StatusUpdate), ReleaseFailure> {
        let target = if event.head_commit_sha.is_empty() {
            event.reference.as_str()
        } else {
            event.head_commit_sha.as_str()
        };

        let request = ReleaseRequest {
            tag: version,
            target,
        };
        let release = host
            .create_release(&request)
            .map_err(|e| ReleaseFailure::Host {
                action: format!("create release {}", version),
                detail: e.to_string(),
            })?;

        info!(tag = %release.tag, "release created");
        let update = StatusUpdate::success(
            format!("Released {}", release.tag),
            format!("Created release {}", release.tag),
        )
        .with_text(release.notes);
        Ok((ReleaseOutcome::Released { tag: release.tag }, update))
    }

    fn propagate<H: Host + ?Sized>(
        &self,
        event: &PushEvent,
        host: &H,
        version: &str,
    ) -> std::result::Result<(ReleaseOutcome, StatusUpdate), ReleaseFailure> {
        let branch = event.branch();
        let config = self.resolve_config(host, branch)?;
        let patch = compute_patch(host, event.default_branch(), branch, &config, version)?;

        match apply_patch(host, branch, &patch)? {
            Some(commit) => {
                let update = StatusUpdate::success(
                    format!("Released {}", version),
                    format!("Updated {} to {} on '{}'", patch.path, version, branch),
                );
                Ok((
                    ReleaseOutcome::Written {
                        version: version.to_string(),
                        path: patch.path,
                        commit,
                    },
                    update,
                ))
            }
            None => {
                info!(path = %patch.path, "version already current");
                let update = StatusUpdate::success(
                    format!("Already at {}", version),
                    format!("{} already at {} on '{}'", patch.path, version, branch),
                );
                Ok((
                    ReleaseOutcome::AlreadyCurrent {
                        version: version.to_string(),
                        path: patch.path,
                    },
                    update,
                ))
            }
        }
    }

    fn resolve_config<H: Host + ?Sized>(
        &self,
        host: &H,
        branch: &str,
    ) -> std::result::Result<ReleaseConfig, ReleaseFailure> {
        let lookup = load_config(host, &self.config_path, branch).map_err(|e| {
            ReleaseFailure::Host {
                action: format!("read {} on {}", self.config_path, branch),
                detail: e.to_string(),
            }
        })?;

        match lookup {
            ConfigLookup::Found(config) => Ok(config),
            ConfigLookup::NotFound => Err(ReleaseFailure::ConfigMissing {
                path: self.config_path.clone(),
                branch: branch.to_string(),
            }),
            ConfigLookup::Invalid(reason) => Err(ReleaseFailure::ConfigInvalid {
                path: self.config_path.clone(),
                reason,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Commit, RepositoryInfo};
    use crate::host::MemoryHost;
    use crate::release_config::DEFAULT_CONFIG_PATH;
    use crate::status::{Conclusion, RecordingReporter};

    fn event(reference: &str, messages: &[&str]) -> PushEvent {
        let commits = messages
            .iter()
            .enumerate()
            .map(|(i, m)| Commit::new(format!("sha{}", i), *m))
            .collect();
        PushEvent::new(
            reference,
            RepositoryInfo::new("octo/widgets", "master"),
            commits,
            "head",
        )
    }

    fn engine() -> ReleaseEngine {
        ReleaseEngine::new("release", DEFAULT_CONFIG_PATH).unwrap()
    }

    #[test]
    fn test_no_directive_is_success() {
        let host = MemoryHost::new();
        let mut reporter = RecordingReporter::new();

        let outcome = engine().handle_push(&event("issue-42", &["plain"]), &host, &mut reporter);

        assert_eq!(outcome, ReleaseOutcome::NoDirective);
        assert!(host.reads().is_empty());
        assert_eq!(reporter.updates().len(), 2);
        assert_eq!(
            reporter.last().unwrap().conclusion(),
            Some(Conclusion::Success)
        );
    }

    #[test]
    fn test_custom_prefix() {
        let engine = ReleaseEngine::new("bump", DEFAULT_CONFIG_PATH).unwrap();
        let event = event("issue-42", &["[release:1.0]", "[bump:2.0]"]);
        assert_eq!(engine.directive(&event), Some("2.0".to_string()));
    }

    #[test]
    fn test_host_error_on_release_is_reported() {
        let host = MemoryHost::new();
        let mut reporter = RecordingReporter::new();
        let push = event("refs/heads/master", &["[release:1.0.0]"]);

        assert!(engine().handle_push(&push, &host, &mut reporter).is_success());
        let outcome = engine().handle_push(&push, &host, &mut reporter);

        assert!(matches!(
            outcome,
            ReleaseOutcome::Failed(ReleaseFailure::Host { .. })
        ));
        assert_eq!(
            reporter.last().unwrap().conclusion(),
            Some(Conclusion::Failure)
        );
    }
}
