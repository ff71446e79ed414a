//! Domain logic - push events, branch policy and version patterns

pub mod branch;
pub mod event;
pub mod pattern;

pub use branch::{is_release_branch, BranchPolicy};
pub use event::{Commit, PushEvent, RepositoryInfo};
pub use pattern::VersionPattern;
