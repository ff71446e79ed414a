//! Hosting capabilities used by the release engine
//!
//! The engine never talks to a concrete hosting platform. It depends on three
//! narrow traits, one per capability it needs:
//!
//! - [ContentReader]: read a file at a ref
//! - [ContentWriter]: update a file on a branch, guarded by the content hash
//!   of the version being replaced
//! - [ReleaseCreator]: create a tag with generated release notes
//!
//! Implementations:
//!
//! - [git2_host::Git2Host]: a local repository driven through `git2`
//! - [memory::MemoryHost]: an in-memory host for tests
//!
//! ```rust
//! # use auto_release::host::{ContentReader, MemoryHost};
//! let host = MemoryHost::new();
//! host.put_file("main", "app/__init__.py", "__version__ = \"0.1\"\n");
//! let file = host.read_file("app/__init__.py", "refs/heads/main").unwrap();
//! assert!(file.is_some());
//! ```

pub mod git2_host;
pub mod memory;

pub use git2_host::Git2Host;
pub use memory::MemoryHost;

use crate::error::Result;

/// File content read from a ref, with the hash used as a write token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    pub path: String,
    pub content: String,
    /// Content hash of this version of the file
    pub sha: String,
}

/// A single-file update on a branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileUpdate<'a> {
    pub path: &'a str,
    pub branch: &'a str,
    pub message: &'a str,
    pub content: &'a str,
    /// Hash of the content being replaced. The write fails when the branch
    /// no longer holds this version.
    pub expected_sha: &'a str,
}

/// Request to tag a commit and publish a release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseRequest<'a> {
    pub tag: &'a str,
    /// Commit sha or ref the tag points at
    pub target: &'a str,
}

/// A created release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub tag: String,
    pub notes: String,
}

/// Read access to repository content
pub trait ContentReader {
    /// Read `path` at `reference` (branch name, full ref or commit sha).
    ///
    /// # Returns
    /// * `Ok(Some(FileContent))` - The file exists at the ref
    /// * `Ok(None)` - The ref has no file at `path`
    /// * `Err` - The ref cannot be resolved or the host failed
    fn read_file(&self, path: &str, reference: &str) -> Result<Option<FileContent>>;
}

/// Write access to repository content
pub trait ContentWriter {
    /// Commit `update.content` to `update.path` on `update.branch`.
    ///
    /// Returns the id of the created commit. A stale `expected_sha` yields
    /// [crate::error::ReleaseError::Conflict]; it is never retried here.
    fn update_file(&self, update: &FileUpdate<'_>) -> Result<String>;
}

/// Release publication
pub trait ReleaseCreator {
    /// Tag `request.target` as `request.tag` with generated release notes
    fn create_release(&self, request: &ReleaseRequest<'_>) -> Result<Release>;
}

/// Everything the release engine needs from a host
pub trait Host: ContentReader + ContentWriter + ReleaseCreator {}

impl<T: ContentReader + ContentWriter + ReleaseCreator + ?Sized> Host for T {}
