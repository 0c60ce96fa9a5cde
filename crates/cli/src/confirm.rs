use console::Term;
use context_changes::{FileDiff, OverwriteGate};
use dialoguer::Confirm;

use crate::render::render_diff;

/// Yes/no prompt on stderr. Without a terminal the answer is "no".
pub fn confirm(prompt: &str) -> bool {
    if !Term::stderr().is_term() {
        log::warn!("{prompt} (no terminal, treating as no; pass --yes to apply)");
        return false;
    }
    match Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact_opt()
    {
        Ok(answer) => answer.unwrap_or(false),
        Err(err) => {
            log::warn!("Confirmation prompt failed: {err}");
            false
        }
    }
}

/// Shows the diff for an existing file and asks before overwriting it
#[derive(Debug, Default)]
pub struct PromptGate {
    show_diff: bool,
}

impl PromptGate {
    pub fn new(show_diff: bool) -> Self {
        Self { show_diff }
    }
}

impl OverwriteGate for PromptGate {
    fn allow_overwrite(&mut self, path: &str, diff: &FileDiff) -> bool {
        if self.show_diff {
            eprint!("{}", render_diff(diff));
        }
        confirm(&format!(
            "Overwrite {path}? (+{} -{})",
            diff.additions, diff.deletions
        ))
    }
}
