use crate::classifier;
use crate::error::{Result, ScanError};
use crate::path_filter::PathFilter;
use crate::rules::ExclusionRuleSet;
use crate::snapshot::ContextSnapshot;
use ignore::WalkBuilder;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Builds a [`ContextSnapshot`] from a project directory
pub struct ContextAssembler {
    root: PathBuf,
    rules: ExclusionRuleSet,
    filter: Arc<PathFilter>,
}

impl ContextAssembler {
    pub fn new(root: impl AsRef<Path>, rules: ExclusionRuleSet) -> Self {
        let filter = Arc::new(PathFilter::new(&rules));
        Self {
            root: root.as_ref().to_path_buf(),
            rules,
            filter,
        }
    }

    /// Walk the root and collect every admissible text file.
    ///
    /// Per-file failures are skipped; only an unusable root is an error.
    pub fn assemble(&self) -> Result<ContextSnapshot> {
        let meta = fs::metadata(&self.root)
            .map_err(|e| ScanError::InvalidRoot(format!("{}: {e}", self.root.display())))?;
        if !meta.is_dir() {
            return Err(ScanError::InvalidRoot(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }

        let mut snapshot = ContextSnapshot::new();
        let respect = self.rules.respect_gitignore;

        let mut builder = WalkBuilder::new(&self.root);
        builder
            .standard_filters(false)
            .hidden(false)
            .parents(respect)
            .ignore(respect)
            .git_ignore(respect)
            .git_exclude(respect)
            .require_git(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b));

        // Pruning here keeps the walker out of excluded trees entirely.
        let filter = Arc::clone(&self.filter);
        builder.filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            if !is_dir {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            if filter.excludes_dir(&name) {
                log::debug!("Pruning excluded directory {}", entry.path().display());
                return false;
            }
            true
        });

        for result in builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    log::debug!("Failed to read entry: {e}");
                    continue;
                }
            };
            let Some(file_type) = entry.file_type() else {
                continue;
            };
            if !file_type.is_file() {
                continue;
            }

            let path = entry.path();
            let Some(rel_path) = relative_path(path, &self.root) else {
                continue;
            };
            self.admit(&mut snapshot, path, rel_path);
        }

        let stats = snapshot.stats();
        log::info!(
            "Assembled {} files ({} bytes), skipped {}",
            stats.admitted,
            stats.admitted_bytes,
            stats.skipped()
        );
        Ok(snapshot)
    }

    fn admit(&self, snapshot: &mut ContextSnapshot, path: &Path, rel_path: String) {
        snapshot.stats_mut().files_seen += 1;

        let size = match fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) => {
                log::debug!("Skipping {rel_path}: {e}");
                snapshot.stats_mut().skipped_unreadable += 1;
                return;
            }
        };
        if size > self.rules.max_file_size {
            log::debug!(
                "Skipping large file {rel_path} ({size} bytes > {})",
                self.rules.max_file_size
            );
            snapshot.stats_mut().skipped_oversize += 1;
            return;
        }

        if self.filter.excludes_by_name(&rel_path) {
            log::debug!("Skipping excluded file {rel_path}");
            snapshot.stats_mut().skipped_excluded += 1;
            return;
        }
        if classifier::is_binary(path) {
            log::debug!("Skipping binary file {rel_path}");
            snapshot.stats_mut().skipped_binary += 1;
            return;
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                log::debug!("Skipping unreadable file {rel_path}: {e}");
                snapshot.stats_mut().skipped_unreadable += 1;
                return;
            }
        };
        if content.trim().is_empty() {
            snapshot.stats_mut().skipped_empty += 1;
            return;
        }

        snapshot.insert(rel_path, content);
    }
}

/// Assemble a snapshot of `root` with `rules`
pub fn assemble(root: impl AsRef<Path>, rules: &ExclusionRuleSet) -> Result<ContextSnapshot> {
    ContextAssembler::new(root, rules.clone()).assemble()
}

/// `/`-separated path of `path` below `root`
fn relative_path(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}
