use crate::classifier;
use crate::rules::ExclusionRuleSet;
use regex::Regex;
use std::path::Path;

/// One compiled exclusion pattern
#[derive(Debug, Clone)]
enum NamePattern {
    /// `name`
    Exact(String),
    /// `*.ext`
    Suffix(String),
    /// `.*`, `tmp*`
    Prefix(String),
    /// `*substr*`
    Contains(String),
    /// Anything else with `*` or `?` in it
    Glob(Regex),
}

impl NamePattern {
    fn compile(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let stars = raw.matches('*').count();
        if raw.contains('?') {
            return Self::glob(raw);
        }

        let pattern = match stars {
            0 => Self::Exact(raw.to_string()),
            1 if raw.starts_with('*') => Self::Suffix(raw[1..].to_string()),
            1 if raw.ends_with('*') => Self::Prefix(raw[..raw.len() - 1].to_string()),
            2 if raw.len() >= 2 && raw.starts_with('*') && raw.ends_with('*') => {
                Self::Contains(raw[1..raw.len() - 1].to_string())
            }
            _ => return Self::glob(raw),
        };
        Some(pattern)
    }

    fn glob(raw: &str) -> Option<Self> {
        let mut expr = String::from("^");
        for ch in raw.chars() {
            match ch {
                '*' => expr.push_str(".*"),
                '?' => expr.push('.'),
                other => expr.push_str(&regex::escape(&other.to_string())),
            }
        }
        expr.push('$');

        match Regex::new(&expr) {
            Ok(re) => Some(Self::Glob(re)),
            Err(e) => {
                log::warn!("Ignoring invalid exclusion pattern {raw:?}: {e}");
                None
            }
        }
    }

    fn is_exact(&self) -> bool {
        matches!(self, Self::Exact(_))
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            Self::Exact(exact) => name == exact,
            Self::Suffix(suffix) => name.ends_with(suffix.as_str()),
            Self::Prefix(prefix) => name.starts_with(prefix.as_str()),
            Self::Contains(needle) => name.contains(needle.as_str()),
            Self::Glob(re) => re.is_match(name),
        }
    }
}

/// Exclusion rules compiled once and shared by the whole walk
#[derive(Debug, Clone)]
pub struct PathFilter {
    dirs: Vec<NamePattern>,
    files: Vec<NamePattern>,
    extensions: Vec<String>,
}

impl PathFilter {
    pub fn new(rules: &ExclusionRuleSet) -> Self {
        Self::from_patterns(&rules.dirs, &rules.files, &rules.extensions)
    }

    pub fn from_patterns(
        dir_patterns: &[String],
        file_patterns: &[String],
        extension_patterns: &[String],
    ) -> Self {
        Self {
            dirs: dir_patterns
                .iter()
                .filter_map(|p| NamePattern::compile(p))
                .collect(),
            files: file_patterns
                .iter()
                .filter_map(|p| NamePattern::compile(p))
                .collect(),
            extensions: extension_patterns
                .iter()
                .map(|e| normalize_extension(e))
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn excludes_dir(&self, name: &str) -> bool {
        self.dirs.iter().any(|p| p.matches(name))
    }

    /// Pattern and extension checks only; never touches the disk.
    ///
    /// `rel_path` uses `/` separators. Exact patterns may name either the base
    /// name or the full relative path.
    pub fn excludes_by_name(&self, rel_path: &str) -> bool {
        let base = rel_path.rsplit('/').next().unwrap_or(rel_path);

        if self
            .files
            .iter()
            .any(|p| p.matches(base) || (p.is_exact() && p.matches(rel_path)))
        {
            return true;
        }

        if self.extensions.is_empty() {
            return false;
        }
        Path::new(base)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .is_some_and(|ext| self.extensions.iter().any(|e| *e == ext))
    }

    /// Full file check: name rules first, then binary classification.
    pub fn excludes_file(&self, path: &Path, rel_path: &str) -> bool {
        self.excludes_by_name(rel_path) || classifier::is_binary(path)
    }
}

/// `true` when `name` matches any directory pattern.
pub fn should_exclude_directory(name: &str, dir_patterns: &[String]) -> bool {
    PathFilter::from_patterns(dir_patterns, &[], &[]).excludes_dir(name)
}

/// `true` when the file at `path` matches a file pattern or extension, or is binary.
pub fn should_exclude_file(
    path: &Path,
    file_patterns: &[String],
    extension_patterns: &[String],
) -> bool {
    let rel = path.to_string_lossy().replace('\\', "/");
    PathFilter::from_patterns(&[], file_patterns, extension_patterns).excludes_file(path, &rel)
}

fn normalize_extension(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('*').unwrap_or(trimmed);
    trimmed.trim_start_matches('.').to_lowercase()
}
