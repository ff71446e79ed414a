//! Release notes generation

use crate::domain::Commit;

const SHORT_SHA_LEN: usize = 7;

/// Render markdown release notes for `tag` from the commits it introduces.
///
/// Commits are listed in the order given, one bullet per commit summary.
pub fn render_release_notes(tag: &str, commits: &[Commit]) -> String {
    let mut notes = format!("## {}\n\n", tag);

    if commits.is_empty() {
        notes.push_str("No changes since the previous release.\n");
        return notes;
    }

    notes.push_str("### Commits\n\n");
    for commit in commits {
        let short_sha = commit.sha.get(..SHORT_SHA_LEN).unwrap_or(&commit.sha);
        notes.push_str(&format!("- {} ({})\n", commit.summary(), short_sha));
    }
    notes
}
