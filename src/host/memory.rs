use std::cell::{Cell, RefCell};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::domain::branch::short_branch_name;
use crate::domain::Commit;
use crate::error::{ReleaseError, Result};
use crate::host::{
    ContentReader, ContentWriter, FileContent, FileUpdate, Release, ReleaseCreator,
    ReleaseRequest,
};
use crate::notes::render_release_notes;

/// A recorded file write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    pub path: String,
    pub branch: String,
    pub message: String,
    pub content: String,
    pub expected_sha: String,
}

/// In-memory host for testing without a repository
///
/// Files are keyed by branch and path. Every read, write and release is
/// recorded so tests can assert which host calls an event caused.
pub struct MemoryHost {
    files: RefCell<HashMap<(String, String), FileContent>>,
    reads: RefCell<Vec<(String, String)>>,
    writes: RefCell<Vec<WriteRecord>>,
    releases: RefCell<Vec<Release>>,
    release_commits: RefCell<Vec<Commit>>,
    pending_conflict: RefCell<Option<(String, String, String)>>,
    commit_counter: Cell<u64>,
}

impl MemoryHost {
    /// Create a new empty host
    pub fn new() -> Self {
        MemoryHost {
            files: RefCell::new(HashMap::new()),
            reads: RefCell::new(Vec::new()),
            writes: RefCell::new(Vec::new()),
            releases: RefCell::new(Vec::new()),
            release_commits: RefCell::new(Vec::new()),
            pending_conflict: RefCell::new(None),
            commit_counter: Cell::new(0),
        }
    }

    /// Store a file on a branch
    pub fn put_file(&self, branch: &str, path: &str, content: &str) {
        let key = (short_branch_name(branch).to_string(), path.to_string());
        let file = FileContent {
            path: path.to_string(),
            content: content.to_string(),
            sha: content_sha(path, content),
        };
        self.files.borrow_mut().insert(key, file);
    }

    /// Current content of a file on a branch
    pub fn file(&self, branch: &str, path: &str) -> Option<String> {
        let key = (short_branch_name(branch).to_string(), path.to_string());
        self.files.borrow().get(&key).map(|f| f.content.clone())
    }

    /// Commits listed in the notes of created releases
    pub fn set_release_commits(&self, commits: Vec<Commit>) {
        *self.release_commits.borrow_mut() = commits;
    }

    /// Change a file just before the next write, as another pusher would
    pub fn simulate_concurrent_write(&self, branch: &str, path: &str, content: &str) {
        *self.pending_conflict.borrow_mut() = Some((
            branch.to_string(),
            path.to_string(),
            content.to_string(),
        ));
    }

    /// `(path, ref)` pairs in read order
    pub fn reads(&self) -> Vec<(String, String)> {
        self.reads.borrow().clone()
    }

    /// True if `path` was read at any ref
    pub fn was_read(&self, path: &str) -> bool {
        self.reads.borrow().iter().any(|(p, _)| p == path)
    }

    pub fn writes(&self) -> Vec<WriteRecord> {
        self.writes.borrow().clone()
    }

    pub fn releases(&self) -> Vec<Release> {
        self.releases.borrow().clone()
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

fn content_sha(path: &str, content: &str) -> String {
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    content.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

impl ContentReader for MemoryHost {
    fn read_file(&self, path: &str, reference: &str) -> Result<Option<FileContent>> {
        let branch = short_branch_name(reference).to_string();
        self.reads
            .borrow_mut()
            .push((path.to_string(), reference.to_string()));
        Ok(self
            .files
            .borrow()
            .get(&(branch, path.to_string()))
            .cloned())
    }
}

impl ContentWriter for MemoryHost {
    fn update_file(&self, update: &FileUpdate<'_>) -> Result<String> {
        if let Some((branch, path, content)) = self.pending_conflict.borrow_mut().take() {
            self.put_file(&branch, &path, &content);
        }

        let key = (
            short_branch_name(update.branch).to_string(),
            update.path.to_string(),
        );
        let current_sha = self.files.borrow().get(&key).map(|f| f.sha.clone());
        if current_sha.as_deref() != Some(update.expected_sha) {
            return Err(ReleaseError::conflict(format!(
                "{} on {} does not match {}",
                update.path, update.branch, update.expected_sha
            )));
        }

        self.put_file(update.branch, update.path, update.content);
        self.writes.borrow_mut().push(WriteRecord {
            path: update.path.to_string(),
            branch: update.branch.to_string(),
            message: update.message.to_string(),
            content: update.content.to_string(),
            expected_sha: update.expected_sha.to_string(),
        });

        let counter = self.commit_counter.get() + 1;
        self.commit_counter.set(counter);
        Ok(format!("commit-{}", counter))
    }
}

impl ReleaseCreator for MemoryHost {
    fn create_release(&self, request: &ReleaseRequest<'_>) -> Result<Release> {
        if self.releases.borrow().iter().any(|r| r.tag == request.tag) {
            return Err(ReleaseError::host(format!(
                "Release {} already exists",
                request.tag
            )));
        }

        let release = Release {
            tag: request.tag.to_string(),
            notes: render_release_notes(request.tag, &self.release_commits.borrow()),
        };
        self.releases.borrow_mut().push(release.clone());
        Ok(release)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_normalizes_refs() {
        let host = MemoryHost::new();
        host.put_file("refs/heads/main", "a.txt", "hello");

        let file = host.read_file("a.txt", "main").unwrap().unwrap();
        assert_eq!(file.content, "hello");
        assert_eq!(host.reads(), vec![("a.txt".to_string(), "main".to_string())]);
        assert!(host.read_file("b.txt", "main").unwrap().is_none());
    }

    #[test]
    fn test_write_requires_current_sha() {
        let host = MemoryHost::new();
        host.put_file("dev", "a.txt", "one");
        let sha = host.read_file("a.txt", "dev").unwrap().unwrap().sha;

        let update = FileUpdate {
            path: "a.txt",
            branch: "dev",
            message: "Release 2",
            content: "two",
            expected_sha: &sha,
        };
        assert_eq!(host.update_file(&update).unwrap(), "commit-1");
        assert_eq!(host.file("dev", "a.txt").as_deref(), Some("two"));

        let err = host.update_file(&update).unwrap_err();
        assert!(matches!(err, ReleaseError::Conflict(_)));
        assert_eq!(host.writes().len(), 1);
    }

    #[test]
    fn test_simulated_concurrent_write_conflicts() {
        let host = MemoryHost::new();
        host.put_file("dev", "a.txt", "one");
        let sha = host.read_file("a.txt", "dev").unwrap().unwrap().sha;
        host.simulate_concurrent_write("dev", "a.txt", "someone else");

        let update = FileUpdate {
            path: "a.txt",
            branch: "dev",
            message: "Release 2",
            content: "two",
            expected_sha: &sha,
        };
        assert!(host.update_file(&update).is_err());
        assert_eq!(host.file("dev", "a.txt").as_deref(), Some("someone else"));
    }

    #[test]
    fn test_duplicate_release_fails() {
        let host = MemoryHost::new();
        let request = ReleaseRequest {
            tag: "1.0.0",
            target: "abc",
        };
        let release = host.create_release(&request).unwrap();
        assert_eq!(release.tag, "1.0.0");
        assert!(host.create_release(&request).is_err());
    }
}
