use serde::{Deserialize, Serialize};

/// Default per-file size cap in bytes
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_000_000;

/// Configuration deciding which parts of a tree make it into a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExclusionRuleSet {
    /// Directory names or patterns pruned from the walk
    pub dirs: Vec<String>,

    /// File names or patterns (`.env`, `*.pyc`, `*lock*`)
    pub files: Vec<String>,

    /// File extensions, with or without the leading dot (matched case-insensitively)
    pub extensions: Vec<String>,

    /// Files larger than this many bytes are never read
    pub max_file_size: u64,

    /// Honour `.gitignore` / `.ignore` / `.git/info/exclude` while walking
    pub respect_gitignore: bool,
}

impl Default for ExclusionRuleSet {
    fn default() -> Self {
        Self {
            dirs: to_strings(DEFAULT_EXCLUDED_DIRS),
            files: to_strings(DEFAULT_EXCLUDED_FILES),
            extensions: to_strings(DEFAULT_EXCLUDED_EXTENSIONS),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            respect_gitignore: false,
        }
    }
}

impl ExclusionRuleSet {
    /// Rule set that excludes nothing except binaries and oversized files
    pub fn empty() -> Self {
        Self {
            dirs: Vec::new(),
            files: Vec::new(),
            extensions: Vec::new(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            respect_gitignore: false,
        }
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn with_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_file_size == 0 {
            return Err("max_file_size must be > 0".to_string());
        }
        Ok(())
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".venv",
    "venv",
    ".git",
    "__pycache__",
    "dist",
    "build",
    ".pytest_cache",
    ".next",
];

const DEFAULT_EXCLUDED_FILES: &[&str] = &[".env", "*.pyc", "*.jpg", "*.png", "*.pdf"];

const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] = &[".pyc", ".jpg", ".png", ".pdf"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_dependency_caches() {
        let rules = ExclusionRuleSet::default();
        assert!(rules.dirs.iter().any(|d| d == "node_modules"));
        assert!(rules.dirs.iter().any(|d| d == ".git"));
        assert_eq!(rules.max_file_size, 1_000_000);
        assert!(!rules.respect_gitignore);
    }

    #[test]
    fn zero_cap_is_rejected() {
        let rules = ExclusionRuleSet::empty().with_max_file_size(0);
        assert!(rules.validate().is_err());
        assert!(ExclusionRuleSet::default().validate().is_ok());
    }
}
