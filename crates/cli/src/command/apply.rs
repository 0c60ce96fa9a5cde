use anyhow::{bail, Result};
use context_changes::{parse_change_set, AllowAll, ApplyOptions, ApplyReport, ChangeSet};
use std::path::Path;

use super::CommandContext;
use crate::confirm::confirm;
use crate::flags::ApplyFlags;
use crate::print_stdout;
use crate::prompts::multi_file_instruction;
use crate::render::{render_diff, render_outcome, render_summary};

pub(crate) const NO_CHANGES: &str = "No file changes were specified in the response.";

/// Generate (or replay) a multi-file change and apply it.
pub(crate) async fn run_refactor(
    ctx: &CommandContext,
    prompt: &str,
    response_file: Option<&Path>,
    flags: ApplyFlags,
    json: bool,
) -> Result<ApplyReport> {
    let response = ctx
        .response_for(response_file, || {
            let snapshot = ctx.assemble()?;
            Ok(snapshot.render_prompt(&multi_file_instruction(prompt)))
        })
        .await?;
    apply_response(ctx, &response, flags, json)
}

/// Apply a saved response (`-` reads stdin).
pub(crate) fn run_apply(
    ctx: &CommandContext,
    source: &Path,
    flags: ApplyFlags,
    json: bool,
) -> Result<ApplyReport> {
    let response = ctx.read_response(source)?;
    apply_response(ctx, &response, flags, json)
}

fn apply_response(
    ctx: &CommandContext,
    response: &str,
    flags: ApplyFlags,
    json: bool,
) -> Result<ApplyReport> {
    let changes = parse_change_set(response);
    if changes.is_empty() {
        eprintln!("{NO_CHANGES}");
        return finish(ApplyReport::default(), json);
    }

    let options = flags.options(ctx.config());
    // In JSON mode the plan goes to stderr so stdout stays parseable.
    if !json || options.require_confirmation {
        show_plan(ctx, &changes, options, json)?;
    }

    if options.require_confirmation && !confirm("Apply these changes?") {
        eprintln!("No changes applied.");
        return finish(ApplyReport::declined(&changes), json);
    }

    // Confirmation covered the whole batch above.
    let executor = ctx.executor(ApplyOptions {
        require_confirmation: false,
        ..options
    });
    let report = executor.apply_all(&changes, &mut AllowAll);

    if !json {
        for outcome in &report.outcomes {
            print_stdout(&render_outcome(outcome))?;
        }
    }
    finish(report, json)
}

fn show_plan(
    ctx: &CommandContext,
    changes: &ChangeSet,
    options: ApplyOptions,
    to_stderr: bool,
) -> Result<()> {
    let emit = |text: &str| -> Result<()> {
        if to_stderr {
            eprintln!("{text}");
            Ok(())
        } else {
            print_stdout(text)
        }
    };

    let executor = ctx.executor(options);
    let paths = changes.paths();
    emit(&format!("\nChanges affect {} file(s):", paths.len()))?;
    for path in &paths {
        emit(&format!("- {path}"))?;
    }

    for change in changes.resolve() {
        match executor.preview(change.proposal) {
            Ok(preview) if !preview.exists => {
                emit(&format!("Note: {} will be created.", preview.path))?;
            }
            Ok(preview) if !preview.diff.has_changes => {
                emit(&format!("{} is unchanged.", preview.path))?;
            }
            Ok(preview) => emit(render_diff(&preview.diff).trim_end())?,
            Err(err) => eprintln!("Error processing {}: {err}", change.proposal.path),
        }
    }
    Ok(())
}

fn finish(report: ApplyReport, json: bool) -> Result<ApplyReport> {
    if json {
        print_stdout(&serde_json::to_string_pretty(&report)?)?;
    } else if !report.outcomes.is_empty() {
        print_stdout(render_summary(&report).trim_end())?;
    }

    if report.has_failures() {
        bail!("{} change(s) failed", report.summary.failed);
    }
    Ok(report)
}
