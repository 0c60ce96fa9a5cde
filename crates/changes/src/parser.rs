//! Extraction of file proposals from free-form generator output.
//!
//! Multi-file responses use a marker line followed directly by a fenced block:
//!
//! ~~~text
//! FILE: src/app.py
//! ```python
//! print("hi")
//! ```
//! ~~~
//!
//! Anything that does not fit the shape is skipped; parsing never fails.

use crate::proposal::{ChangeProposal, ChangeSet};

const MARKER: &str = "FILE:";
const FENCE: &str = "```";

/// Parse every well-formed `FILE:` block in `text`.
pub fn parse_change_set(text: &str) -> ChangeSet {
    let lines = split_lines(text);
    let mut set = ChangeSet::default();
    let mut idx = 0;

    while idx < lines.len() {
        let Some(path) = marker_path(lines[idx]) else {
            idx += 1;
            continue;
        };
        if !lines.get(idx + 1).is_some_and(|line| is_open_fence(line)) {
            log::debug!("Dropping marker for {path}: no fence on the next line");
            idx += 1;
            continue;
        }

        match fenced_body(&lines, idx + 2) {
            Some((body, close)) if !body.is_empty() => {
                set.push(ChangeProposal::new(path, body));
                idx = close + 1;
            }
            Some(_) => {
                log::debug!("Dropping marker for {path}: empty body");
                idx += 1;
            }
            None => {
                log::debug!("Dropping marker for {path}: fence never closed");
                idx += 1;
            }
        }
    }

    set
}

/// Content for the single-file flow.
///
/// The body of the first complete fenced block, or the whole text when the
/// response carries no fence at all.
pub fn extract_single_file(text: &str) -> String {
    let lines = split_lines(text);
    for (idx, line) in lines.iter().enumerate() {
        if !is_open_fence(line) {
            continue;
        }
        if let Some((body, _)) = fenced_body(&lines, idx + 1) {
            return body;
        }
    }
    text.to_string()
}

fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

fn marker_path(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix(MARKER)?;
    let path = rest.trim();
    (!path.is_empty()).then_some(path)
}

fn is_open_fence(line: &str) -> bool {
    let Some(lang) = line.trim_start().strip_prefix(FENCE) else {
        return false;
    };
    let lang = lang.trim_end();
    lang.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '#' | '.' | '-'))
}

fn is_close_fence(line: &str) -> bool {
    line.trim() == FENCE
}

/// Body lines from `start` up to the closing fence, plus the fence's index.
fn fenced_body(lines: &[&str], start: usize) -> Option<(String, usize)> {
    let mut body = String::new();
    for (offset, line) in lines.get(start..)?.iter().enumerate() {
        if is_close_fence(line) {
            return Some((body, start + offset));
        }
        body.push_str(line);
        body.push('\n');
    }
    None
}
