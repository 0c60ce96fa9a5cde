use crate::stats::ScanStats;
use serde::Serialize;
use std::collections::BTreeMap;

/// Relative path → text content for every admitted file, ordered by path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContextSnapshot {
    files: BTreeMap<String, String>,
    stats: ScanStats,
}

impl ContextSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, rel_path: String, content: String) {
        self.stats.add_admitted(content.len());
        self.files.insert(rel_path, content);
    }

    pub(crate) fn stats_mut(&mut self) -> &mut ScanStats {
        &mut self.stats
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    pub fn get(&self, rel_path: &str) -> Option<&str> {
        self.files.get(rel_path).map(String::as_str)
    }

    pub fn contains(&self, rel_path: &str) -> bool {
        self.files.contains_key(rel_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `File: <path>` header followed by the content, one block per file
    pub fn render_context(&self) -> String {
        self.iter()
            .map(|(path, content)| format!("File: {path}\n{content}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Full prompt sent to the text generator
    pub fn render_prompt(&self, instruction: &str) -> String {
        format!(
            "Codebase Context:\n{}\n\nUser Prompt: {instruction}",
            self.render_context()
        )
    }
}

impl<'a> IntoIterator for &'a ContextSnapshot {
    type Item = (&'a String, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}
