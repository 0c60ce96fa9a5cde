use serde::Serialize;
use similar::{ChangeTag, TextDiff};

/// Lines of unchanged context around each hunk
pub const CONTEXT_RADIUS: usize = 3;

/// Preview of replacing one file's content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDiff {
    pub path: String,
    pub has_changes: bool,
    /// Unified diff text; empty when nothing changed
    pub rendered: String,
    pub additions: usize,
    pub deletions: usize,
}

/// Line-based unified diff between `original` and `proposed`.
pub fn diff(original: &str, proposed: &str, path: &str) -> FileDiff {
    let text_diff = TextDiff::from_lines(original, proposed);

    let mut additions = 0;
    let mut deletions = 0;
    for change in text_diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => additions += 1,
            ChangeTag::Delete => deletions += 1,
            ChangeTag::Equal => {}
        }
    }

    let has_changes = additions > 0 || deletions > 0;
    let rendered = if has_changes {
        text_diff
            .unified_diff()
            .context_radius(CONTEXT_RADIUS)
            .header(&format!("a/{path}"), &format!("b/{path}"))
            .to_string()
    } else {
        String::new()
    };

    FileDiff {
        path: path.to_string(),
        has_changes,
        rendered,
        additions,
        deletions,
    }
}
