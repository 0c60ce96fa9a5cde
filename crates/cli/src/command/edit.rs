use anyhow::{bail, Result};
use context_changes::{
    extract_single_file, ApplyOptions, ChangeProposal, MutationExecutor, MutationOutcome,
    OutcomeStatus,
};
use std::path::Path;

use super::CommandContext;
use crate::confirm::PromptGate;
use crate::flags::ApplyFlags;
use crate::print_stdout;
use crate::prompts::single_file_instruction;
use crate::render::{render_diff, render_outcome};

/// Rewrite one existing file from a generated (or saved) full-file response.
pub(crate) async fn run_edit(
    ctx: &CommandContext,
    file: &str,
    prompt: &str,
    response_file: Option<&Path>,
    flags: ApplyFlags,
) -> Result<MutationOutcome> {
    let options = flags.options(ctx.config());
    let executor = ctx.executor(options);
    let target = executor.resolve(file)?;
    if !target.is_file() {
        bail!("File {file} does not exist");
    }

    let response = ctx
        .response_for(response_file, || {
            let snapshot = ctx.assemble()?;
            Ok(snapshot.render_prompt(&single_file_instruction(file, prompt)))
        })
        .await?;

    let proposal = ChangeProposal::new(file, extract_single_file(&response));
    let outcome = overwrite_with_prompt(&executor, options, &proposal)?;
    report_outcome(outcome)
}

/// Overwrite an existing file, asking with its diff unless confirmation is off.
pub(super) fn overwrite_with_prompt(
    executor: &MutationExecutor,
    options: ApplyOptions,
    proposal: &ChangeProposal,
) -> Result<MutationOutcome> {
    // The gate shows the diff when it asks; without a prompt it is printed up front.
    if !options.require_confirmation {
        let preview = executor.preview(proposal)?;
        if preview.diff.has_changes {
            print_stdout(render_diff(&preview.diff).trim_end())?;
        }
    }
    Ok(executor.apply(proposal, &mut PromptGate::new(true)))
}

/// Print a single-file outcome; a failed write becomes the command's error.
pub(super) fn report_outcome(outcome: MutationOutcome) -> Result<MutationOutcome> {
    print_stdout(&render_outcome(&outcome))?;
    if outcome.status == OutcomeStatus::Failed {
        bail!(
            "Failed to update {}: {}",
            outcome.path,
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ConfigSource};
    use context_changes::SkipReason;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn ctx(temp: &TempDir) -> CommandContext {
        CommandContext::new(
            temp.path().to_path_buf(),
            Config::default(),
            ConfigSource::Defaults,
        )
    }

    fn yes() -> ApplyFlags {
        ApplyFlags {
            yes: true,
            no_backup: false,
        }
    }

    #[tokio::test]
    async fn saved_fenced_response_replaces_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("app.py"), "print(1)\n").unwrap();
        let saved = temp.path().join("reply.md");
        fs::write(&saved, "Sure:\n```python\nprint(2)\n```\n").unwrap();

        let outcome = run_edit(&ctx(&temp), "app.py", "bump", Some(&saved), yes())
            .await
            .unwrap();

        assert_eq!(outcome.status, OutcomeStatus::Overwritten);
        assert_eq!(
            fs::read_to_string(temp.path().join("app.py")).unwrap(),
            "print(2)\n"
        );
        assert_eq!(
            fs::read_to_string(temp.path().join("app.py.bak")).unwrap(),
            "print(1)\n"
        );
    }

    #[tokio::test]
    async fn identical_response_is_unchanged() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("app.py"), "print(1)\n").unwrap();
        let saved = temp.path().join("reply.md");
        fs::write(&saved, "print(1)\n").unwrap();

        let outcome = run_edit(&ctx(&temp), "app.py", "noop", Some(&saved), yes())
            .await
            .unwrap();
        assert_eq!(outcome.skip_reason, Some(SkipReason::Unchanged));
        assert!(!temp.path().join("app.py.bak").exists());
    }

    #[tokio::test]
    async fn missing_file_is_rejected() {
        let temp = TempDir::new().unwrap();
        let saved = temp.path().join("reply.md");
        fs::write(&saved, "x").unwrap();

        let err = run_edit(&ctx(&temp), "ghost.py", "x", Some(&saved), yes())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
        assert!(!temp.path().join("ghost.py").exists());
    }
}
