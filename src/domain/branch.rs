/// Prefix of fully-qualified branch references
pub const HEADS_PREFIX: &str = "refs/heads/";

/// What a push to a given ref should trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchPolicy {
    /// Push to the default branch: create a tag and release
    Release,
    /// Push to any other branch: propagate the version into the tracked file
    Propagation,
}

impl BranchPolicy {
    /// Classify a push by its ref against the repository's default branch
    pub fn resolve(reference: &str, default_branch: &str) -> Self {
        if is_release_branch(reference, default_branch) {
            BranchPolicy::Release
        } else {
            BranchPolicy::Propagation
        }
    }
}

/// True when `reference` ends with the default branch name.
///
/// Matches both the short form (`master`) and the fully-qualified ref
/// (`refs/heads/master`).
pub fn is_release_branch(reference: &str, default_branch: &str) -> bool {
    reference.ends_with(default_branch)
}

/// Strip `refs/heads/` from a ref, leaving other refs untouched
pub fn short_branch_name(reference: &str) -> &str {
    reference.strip_prefix(HEADS_PREFIX).unwrap_or(reference)
}

/// Qualify a branch name as `refs/heads/<name>` unless it already is a ref
pub fn branch_ref_name(branch: &str) -> String {
    if branch.starts_with("refs/") {
        branch.to_string()
    } else {
        format!("{}{}", HEADS_PREFIX, branch)
    }
}
