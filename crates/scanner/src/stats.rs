use serde::{Deserialize, Serialize};

/// Statistics about one assembly walk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Regular files visited after directory pruning
    pub files_seen: usize,

    /// Files admitted into the snapshot
    pub admitted: usize,

    /// Total bytes of admitted content
    pub admitted_bytes: u64,

    /// Skipped for exceeding the size cap
    pub skipped_oversize: usize,

    /// Skipped by a name or extension rule
    pub skipped_excluded: usize,

    /// Skipped as binary content
    pub skipped_binary: usize,

    /// Skipped because metadata or content could not be read
    pub skipped_unreadable: usize,

    /// Skipped because the content is blank
    pub skipped_empty: usize,
}

impl ScanStats {
    pub fn skipped(&self) -> usize {
        self.skipped_oversize
            + self.skipped_excluded
            + self.skipped_binary
            + self.skipped_unreadable
            + self.skipped_empty
    }

    pub(crate) fn add_admitted(&mut self, bytes: usize) {
        self.admitted += 1;
        self.admitted_bytes += bytes as u64;
    }
}
