use crate::diff::{diff, FileDiff};
use crate::error::{ChangeError, Result};
use crate::gate::OverwriteGate;
use crate::outcome::{ApplyReport, MutationOutcome, SkipReason};
use crate::proposal::{ChangeProposal, ChangeSet};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, Permissions};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

/// Safety switches for applying proposals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyOptions {
    /// Copy an existing file to `<path>.bak` before overwriting it
    pub backup: bool,

    /// Ask the gate before overwriting an existing file
    pub require_confirmation: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            backup: true,
            require_confirmation: true,
        }
    }
}

/// Proposal compared against the live tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub path: String,
    pub exists: bool,
    pub diff: FileDiff,
}

/// Writes proposals into a working tree
#[derive(Debug, Clone)]
pub struct MutationExecutor {
    root: PathBuf,
    options: ApplyOptions,
}

impl MutationExecutor {
    pub fn new(root: impl AsRef<Path>, options: ApplyOptions) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            options,
        }
    }

    /// Map a proposal path onto the working tree.
    ///
    /// Rejects `..` components and absolute paths outside the root.
    pub fn resolve(&self, raw: &str) -> Result<PathBuf> {
        let normalized = raw.trim().replace('\\', "/");
        if normalized.is_empty() {
            return Err(ChangeError::EmptyPath);
        }

        let candidate = Path::new(&normalized);
        let relative = if candidate.is_absolute() {
            candidate
                .strip_prefix(&self.root)
                .map_err(|_| ChangeError::PathEscapesRoot(normalized.clone()))?
        } else {
            candidate
        };

        let mut resolved = self.root.clone();
        let mut depth = 0usize;
        for component in relative.components() {
            match component {
                Component::Normal(part) => {
                    resolved.push(part);
                    depth += 1;
                }
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(ChangeError::PathEscapesRoot(normalized.clone()));
                }
            }
        }

        if depth == 0 {
            return Err(ChangeError::EmptyPath);
        }
        Ok(resolved)
    }

    /// Diff a proposal against the current file, or against nothing if missing
    pub fn preview(&self, proposal: &ChangeProposal) -> Result<Preview> {
        let target = self.resolve(&proposal.path)?;
        let existing = read_existing(&target)?;
        let path = proposal.path.trim().to_string();
        let diff = diff(
            existing.as_ref().map_or("", |e| e.text.as_str()),
            &proposal.content,
            &path,
        );
        Ok(Preview {
            exists: existing.is_some(),
            path,
            diff,
        })
    }

    /// Apply one proposal. Errors never escape; they land in the outcome.
    pub fn apply(
        &self,
        proposal: &ChangeProposal,
        gate: &mut dyn OverwriteGate,
    ) -> MutationOutcome {
        let display = proposal.path.trim();
        let outcome = match self.resolve(display) {
            Ok(target) => self.apply_to(display, &target, &proposal.content, gate),
            Err(e) => MutationOutcome::failed(display, e, None),
        };

        match &outcome.error {
            Some(error) => log::warn!("Failed to apply {display}: {error}"),
            None => log::debug!("{display}: {:?}", outcome.status),
        }
        outcome
    }

    /// Apply a whole response; one outcome per proposal, in parse order.
    pub fn apply_all(&self, set: &ChangeSet, gate: &mut dyn OverwriteGate) -> ApplyReport {
        let mut slots: Vec<Option<MutationOutcome>> = vec![None; set.len()];

        for change in set.resolve() {
            let outcome = self.apply(change.proposal, gate);
            for idx in change.superseded {
                slots[idx] = Some(MutationOutcome::skipped(
                    change.proposal.path.trim(),
                    SkipReason::Superseded,
                ));
            }
            slots[change.index] = Some(outcome);
        }

        let report: ApplyReport = slots.into_iter().flatten().collect();
        log::info!(
            "Applied changes: created {}, overwritten {}, skipped {}, failed {}",
            report.summary.created,
            report.summary.overwritten,
            report.summary.skipped,
            report.summary.failed
        );
        report
    }

    fn apply_to(
        &self,
        display: &str,
        target: &Path,
        content: &str,
        gate: &mut dyn OverwriteGate,
    ) -> MutationOutcome {
        let existing = match read_existing(target) {
            Ok(existing) => existing,
            Err(e) => return MutationOutcome::failed(display, e, None),
        };

        let Some(existing) = existing else {
            return match write_atomic(target, content) {
                Ok(()) => MutationOutcome::written(display, false, None),
                Err(e) => MutationOutcome::failed(display, e, None),
            };
        };

        if existing.bytes == content.as_bytes() {
            return MutationOutcome::skipped(display, SkipReason::Unchanged);
        }
        let preview = diff(&existing.text, content, display);
        if self.options.require_confirmation && !gate.allow_overwrite(display, &preview) {
            return MutationOutcome::skipped(display, SkipReason::Declined);
        }

        let backup = if self.options.backup {
            match backup_file(target) {
                Ok(path) => Some(path),
                Err(e) => return MutationOutcome::failed(display, e, None),
            }
        } else {
            None
        };

        match write_atomic(target, content) {
            Ok(()) => MutationOutcome::written(display, true, backup),
            Err(e) => MutationOutcome::failed(display, e, backup),
        }
    }
}

/// `foo.py` → `foo.py.bak`
pub fn backup_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".bak");
    path.with_file_name(name)
}

/// Copy `target` to its backup through a temp sibling, so an existing
/// `.bak` symlink is replaced rather than followed.
fn backup_file(target: &Path) -> Result<PathBuf> {
    let backup = backup_path_for(target);
    let tmp = hidden_sibling(&backup);
    let failed = |source| ChangeError::BackupFailed {
        path: target.to_path_buf(),
        source,
    };

    remove_if_present(&tmp).map_err(failed)?;
    if let Err(e) = fs::copy(target, &tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(failed(e));
    }
    if let Err(e) = fs::rename(&tmp, &backup) {
        let _ = fs::remove_file(&tmp);
        return Err(failed(e));
    }
    log::debug!("Backed up {} to {}", target.display(), backup.display());
    Ok(backup)
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// `dir/name` → `dir/.name.tmp-<pid>`
fn hidden_sibling(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    path.with_file_name(format!(".{file_name}.tmp-{}", std::process::id()))
}

/// Bytes on disk plus a lossy decoding for diffs
struct Existing {
    bytes: Vec<u8>,
    text: String,
}

/// Current content, or `None` when the file does not exist
fn read_existing(target: &Path) -> Result<Option<Existing>> {
    let meta = match fs::metadata(target) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ChangeError::io("stat", target, e)),
    };
    if !meta.is_file() {
        return Err(ChangeError::NotAFile(target.to_path_buf()));
    }
    let bytes = fs::read(target).map_err(|e| ChangeError::io("read", target, e))?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    Ok(Some(Existing { bytes, text }))
}

/// Write through a hidden sibling and rename it over `path`.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ChangeError::io("create directory", parent, e))?;
    }

    let tmp = hidden_sibling(path);
    let permissions = fs::metadata(path).ok().map(|meta| meta.permissions());

    remove_if_present(&tmp).map_err(|e| ChangeError::io("remove", &tmp, e))?;
    if let Err(e) = write_tmp(&tmp, content, permissions) {
        let _ = fs::remove_file(&tmp);
        return Err(ChangeError::io("write", &tmp, e));
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(ChangeError::io("rename", path, e));
    }
    Ok(())
}

fn write_tmp(tmp: &Path, content: &str, permissions: Option<Permissions>) -> io::Result<()> {
    let mut file = File::create(tmp)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;
    if let Some(permissions) = permissions {
        fs::set_permissions(tmp, permissions)?;
    }
    Ok(())
}
