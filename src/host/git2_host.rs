use git2::build::TreeUpdateBuilder;
use git2::{ErrorCode, FileMode, Oid, Repository, Signature, Sort};
use std::path::Path;
use tracing::debug;

use crate::domain::branch::branch_ref_name;
use crate::domain::Commit;
use crate::error::{ReleaseError, Result};
use crate::host::{
    ContentReader, ContentWriter, FileContent, FileUpdate, Release, ReleaseCreator,
    ReleaseRequest,
};
use crate::notes::render_release_notes;
use crate::settings::Committer;

/// Host backed by a local git repository.
///
/// Content hashes are blob ids. File updates become commits on the branch
/// and releases become annotated tags whose message holds the notes.
pub struct Git2Host {
    repo: Repository,
    committer: Committer,
}

impl Git2Host {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path)?;

        Ok(Git2Host {
            repo,
            committer: Committer::default(),
        })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Repository) -> Self {
        Git2Host {
            repo,
            committer: Committer::default(),
        }
    }

    /// Use `committer` for generated commits and tags
    pub fn with_committer(mut self, committer: Committer) -> Self {
        self.committer = committer;
        self
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    fn signature(&self) -> Result<Signature<'static>> {
        Ok(Signature::now(
            &self.committer.name,
            &self.committer.email,
        )?)
    }

    fn resolve_commit(&self, reference: &str) -> Result<git2::Commit<'_>> {
        let object = self.repo.revparse_single(reference).map_err(|e| {
            ReleaseError::host(format!("Cannot resolve '{}': {}", reference, e.message()))
        })?;
        Ok(object.peel_to_commit()?)
    }

    /// Blob and file mode of `path` in `commit`'s tree
    fn entry_at(&self, commit: &git2::Commit<'_>, path: &str) -> Result<Option<(Oid, i32)>> {
        let tree = commit.tree()?;
        match tree.get_path(Path::new(path)) {
            Ok(entry) => {
                if entry.kind() != Some(git2::ObjectType::Blob) {
                    return Err(ReleaseError::host(format!("'{}' is not a file", path)));
                }
                Ok(Some((entry.id(), entry.filemode())))
            }
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Commits reachable from `target` but not from any existing tag,
    /// oldest first
    fn commits_since_last_tag(&self, target: Oid) -> Result<Vec<Commit>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;
        revwalk.push(target)?;

        let tags = self.repo.tag_names(None)?;
        for name in tags.iter().flatten() {
            let reference = self.repo.find_reference(&format!("refs/tags/{}", name))?;
            if let Ok(commit) = reference.peel_to_commit() {
                revwalk.hide(commit.id())?;
            }
        }

        let mut commits = Vec::new();
        for oid_result in revwalk {
            let oid = oid_result?;
            let commit = self.repo.find_commit(oid)?;
            let message = commit.message().unwrap_or("(empty message)").to_string();
            commits.push(Commit::new(oid.to_string(), message));
        }
        Ok(commits)
    }
}

impl ContentReader for Git2Host {
    fn read_file(&self, path: &str, reference: &str) -> Result<Option<FileContent>> {
        let commit = self.resolve_commit(reference)?;
        let (oid, _) = match self.entry_at(&commit, path)? {
            Some(entry) => entry,
            None => return Ok(None),
        };

        let blob = self.repo.find_blob(oid)?;
        let content = String::from_utf8(blob.content().to_vec())
            .map_err(|_| ReleaseError::host(format!("'{}' is not valid UTF-8", path)))?;
        debug!(path, reference, sha = %oid, "read file");

        Ok(Some(FileContent {
            path: path.to_string(),
            content,
            sha: oid.to_string(),
        }))
    }
}

impl ContentWriter for Git2Host {
    fn update_file(&self, update: &FileUpdate<'_>) -> Result<String> {
        let ref_name = branch_ref_name(update.branch);
        let reference = self.repo.find_reference(&ref_name).map_err(|e| {
            ReleaseError::host(format!("Cannot find branch '{}': {}", update.branch, e.message()))
        })?;
        let parent = reference.peel_to_commit()?;

        let (current, filemode) = match self.entry_at(&parent, update.path)? {
            Some((oid, mode)) => (Some(oid.to_string()), mode),
            None => (None, i32::from(FileMode::Blob)),
        };
        if current.as_deref() != Some(update.expected_sha) {
            return Err(ReleaseError::conflict(format!(
                "expected {} at {} but found {}",
                update.expected_sha,
                update.path,
                current.as_deref().unwrap_or("no file")
            )));
        }

        let mode = if filemode == i32::from(FileMode::BlobExecutable) {
            FileMode::BlobExecutable
        } else {
            FileMode::Blob
        };
        let blob = self.repo.blob(update.content.as_bytes())?;
        let mut builder = TreeUpdateBuilder::new();
        builder.upsert(update.path, blob, mode);
        let tree_oid = builder.create_updated(&self.repo, &parent.tree()?)?;
        let tree = self.repo.find_tree(tree_oid)?;

        let signature = self.signature()?;
        let commit = self
            .repo
            .commit(
                Some(ref_name.as_str()),
                &signature,
                &signature,
                update.message,
                &tree,
                &[&parent],
            )
            .map_err(|e| {
                if e.code() == ErrorCode::Modified {
                    ReleaseError::conflict(format!("'{}' moved during update", update.branch))
                } else {
                    ReleaseError::from(e)
                }
            })?;

        Ok(commit.to_string())
    }
}

impl ReleaseCreator for Git2Host {
    fn create_release(&self, request: &ReleaseRequest<'_>) -> Result<Release> {
        let tag_ref = format!("refs/tags/{}", request.tag);
        match self.repo.find_reference(&tag_ref) {
            Ok(_) => {
                return Err(ReleaseError::host(format!(
                    "Tag '{}' already exists",
                    request.tag
                )))
            }
            Err(e) if e.code() == ErrorCode::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let commit = self.resolve_commit(request.target)?;
        let commits = self.commits_since_last_tag(commit.id())?;
        let notes = render_release_notes(request.tag, &commits);

        let signature = self.signature()?;
        self.repo
            .tag(request.tag, commit.as_object(), &signature, &notes, false)
            .map_err(|e| {
                ReleaseError::host(format!("Cannot create tag '{}': {}", request.tag, e.message()))
            })?;

        Ok(Release {
            tag: request.tag.to_string(),
            notes,
        })
    }
}
