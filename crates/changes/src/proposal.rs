use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Replacement content proposed for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeProposal {
    /// Target path as written in the response, trimmed
    pub path: String,

    /// Complete new file content
    pub content: String,
}

impl ChangeProposal {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Proposals in the order they were parsed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    proposals: Vec<ChangeProposal>,
}

/// One target after duplicate collapsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChange<'a> {
    /// Last proposal seen for the path
    pub proposal: &'a ChangeProposal,

    /// Parse index of `proposal`
    pub index: usize,

    /// Indices of earlier proposals for the same path
    pub superseded: Vec<usize>,
}

impl ChangeSet {
    pub fn new(proposals: Vec<ChangeProposal>) -> Self {
        Self { proposals }
    }

    pub fn push(&mut self, proposal: ChangeProposal) {
        self.proposals.push(proposal);
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }

    pub fn proposals(&self) -> &[ChangeProposal] {
        &self.proposals
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChangeProposal> {
        self.proposals.iter()
    }

    /// Distinct target paths in first-seen order
    pub fn paths(&self) -> Vec<&str> {
        self.resolve()
            .into_iter()
            .map(|change| change.proposal.path.as_str())
            .collect()
    }

    /// Collapse duplicate targets: first-seen position, last-seen content.
    pub fn resolve(&self) -> Vec<ResolvedChange<'_>> {
        let mut slots: HashMap<&str, usize> = HashMap::new();
        let mut resolved: Vec<ResolvedChange<'_>> = Vec::new();

        for (idx, proposal) in self.proposals.iter().enumerate() {
            match slots.get(proposal.path.as_str()) {
                Some(&slot) => {
                    let entry = &mut resolved[slot];
                    entry.superseded.push(entry.index);
                    entry.proposal = proposal;
                    entry.index = idx;
                }
                None => {
                    slots.insert(proposal.path.as_str(), resolved.len());
                    resolved.push(ResolvedChange {
                        proposal,
                        index: idx,
                        superseded: Vec::new(),
                    });
                }
            }
        }

        resolved
    }
}

impl From<Vec<ChangeProposal>> for ChangeSet {
    fn from(proposals: Vec<ChangeProposal>) -> Self {
        Self::new(proposals)
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a ChangeProposal;
    type IntoIter = std::slice::Iter<'a, ChangeProposal>;

    fn into_iter(self) -> Self::IntoIter {
        self.proposals.iter()
    }
}
