use console::style;
use context_changes::{ApplyReport, FileDiff, MutationOutcome, OutcomeStatus};
use context_scanner::ContextSnapshot;
use std::fmt::Write;

/// Unified diff with `+` green, `-` red, hunk headers cyan, file headers bold
pub fn render_diff(diff: &FileDiff) -> String {
    let mut out = String::new();
    for line in diff.rendered.lines() {
        let styled = if line.starts_with("+++") || line.starts_with("---") {
            style(line).bold().to_string()
        } else if line.starts_with("@@") {
            style(line).cyan().to_string()
        } else if line.starts_with('+') {
            style(line).green().to_string()
        } else if line.starts_with('-') {
            style(line).red().to_string()
        } else {
            line.to_string()
        };
        out.push_str(&styled);
        out.push('\n');
    }
    out
}

pub fn render_snapshot(snapshot: &ContextSnapshot) -> String {
    let mut out = String::new();
    for (path, content) in snapshot {
        let _ = writeln!(out, "{:>9}  {path}", content.len());
    }
    let stats = snapshot.stats();
    let _ = writeln!(
        out,
        "{} files, {} bytes (skipped: {} excluded, {} binary, {} oversize, {} empty, {} unreadable)",
        stats.admitted,
        stats.admitted_bytes,
        stats.skipped_excluded,
        stats.skipped_binary,
        stats.skipped_oversize,
        stats.skipped_empty,
        stats.skipped_unreadable
    );
    out
}

pub fn render_outcome(outcome: &MutationOutcome) -> String {
    match outcome.status {
        OutcomeStatus::Created => format!("{} {}", style("Created").green(), outcome.path),
        OutcomeStatus::Overwritten => match &outcome.backup_path {
            Some(backup) => format!(
                "{} {} (backup: {})",
                style("Updated").green(),
                outcome.path,
                backup.display()
            ),
            None => format!("{} {}", style("Updated").green(), outcome.path),
        },
        OutcomeStatus::Skipped => format!(
            "{} {} ({})",
            style("Skipped").yellow(),
            outcome.path,
            outcome.skip_reason.map_or("skipped", |r| r.as_str())
        ),
        OutcomeStatus::Failed => format!(
            "{} {}: {}",
            style("Failed").red(),
            outcome.path,
            outcome.error.as_deref().unwrap_or("unknown error")
        ),
    }
}

/// `created N, overwritten N, skipped N, failed N` plus one line per failure
pub fn render_summary(report: &ApplyReport) -> String {
    let s = &report.summary;
    let mut out = format!(
        "created {}, overwritten {}, skipped {}, failed {}\n",
        s.created, s.overwritten, s.skipped, s.failed
    );
    for failure in report.failures() {
        let _ = writeln!(
            out,
            "  {}: {}",
            failure.path,
            failure.error.as_deref().unwrap_or("unknown error")
        );
    }
    out
}
