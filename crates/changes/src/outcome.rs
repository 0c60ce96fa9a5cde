use crate::proposal::ChangeSet;
use serde::Serialize;
use std::path::PathBuf;

/// What happened to one proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Created,
    Overwritten,
    Skipped,
    Failed,
}

/// Why a proposal was not written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The gate refused to overwrite an existing file
    Declined,
    /// The file already holds exactly this content
    Unchanged,
    /// A later proposal in the same response targets the same path
    Superseded,
}

impl SkipReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            SkipReason::Declined => "declined",
            SkipReason::Unchanged => "unchanged",
            SkipReason::Superseded => "superseded",
        }
    }
}

/// Per-path record of one apply step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationOutcome {
    pub path: String,
    pub status: OutcomeStatus,
    pub applied: bool,
    pub backed_up: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<SkipReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MutationOutcome {
    pub(crate) fn written(path: &str, existed: bool, backup_path: Option<PathBuf>) -> Self {
        Self {
            path: path.to_string(),
            status: if existed {
                OutcomeStatus::Overwritten
            } else {
                OutcomeStatus::Created
            },
            applied: true,
            backed_up: backup_path.is_some(),
            backup_path,
            skip_reason: None,
            error: None,
        }
    }

    pub(crate) fn skipped(path: &str, reason: SkipReason) -> Self {
        Self {
            path: path.to_string(),
            status: OutcomeStatus::Skipped,
            applied: false,
            backed_up: false,
            backup_path: None,
            skip_reason: Some(reason),
            error: None,
        }
    }

    /// Skipped because the overwrite or the whole batch was refused
    pub fn declined(path: &str) -> Self {
        Self::skipped(path, SkipReason::Declined)
    }

    pub(crate) fn failed(path: &str, error: impl ToString, backup_path: Option<PathBuf>) -> Self {
        Self {
            path: path.to_string(),
            status: OutcomeStatus::Failed,
            applied: false,
            backed_up: backup_path.is_some(),
            backup_path,
            skip_reason: None,
            error: Some(error.to_string()),
        }
    }
}

/// Counts across a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplySummary {
    pub created: usize,
    pub overwritten: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ApplySummary {
    pub fn record(&mut self, outcome: &MutationOutcome) {
        match outcome.status {
            OutcomeStatus::Created => self.created += 1,
            OutcomeStatus::Overwritten => self.overwritten += 1,
            OutcomeStatus::Skipped => self.skipped += 1,
            OutcomeStatus::Failed => self.failed += 1,
        }
    }

    pub fn applied(&self) -> usize {
        self.created + self.overwritten
    }
}

/// Full result of a batch apply, one outcome per proposal in parse order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub outcomes: Vec<MutationOutcome>,
    pub summary: ApplySummary,
}

impl ApplyReport {
    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }

    /// Report for a batch refused before anything was written: every proposal, in parse order
    pub fn declined(set: &ChangeSet) -> Self {
        set.iter()
            .map(|proposal| MutationOutcome::declined(proposal.path.trim()))
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = &MutationOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Failed)
    }
}

impl FromIterator<MutationOutcome> for ApplyReport {
    fn from_iter<I: IntoIterator<Item = MutationOutcome>>(iter: I) -> Self {
        let mut report = ApplyReport::default();
        for outcome in iter {
            report.summary.record(&outcome);
            report.outcomes.push(outcome);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::ChangeProposal;
    use pretty_assertions::assert_eq;

    #[test]
    fn declined_batch_covers_every_proposal() {
        let set = ChangeSet::new(vec![
            ChangeProposal::new(" a.py ", "x"),
            ChangeProposal::new("b.py", "y"),
            ChangeProposal::new("a.py", "z"),
        ]);

        let report = ApplyReport::declined(&set);

        let paths: Vec<_> = report.outcomes.iter().map(|o| o.path.as_str()).collect();
        assert_eq!(paths, vec!["a.py", "b.py", "a.py"]);
        assert!(report
            .outcomes
            .iter()
            .all(|o| o.skip_reason == Some(SkipReason::Declined) && !o.applied));
        assert_eq!(report.summary.skipped, 3);
        assert_eq!(report.summary.applied(), 0);
        assert!(!report.has_failures());
    }

    #[test]
    fn declined_report_differs_from_empty_one() {
        let set = ChangeSet::new(vec![ChangeProposal::new("a.py", "x")]);
        assert_ne!(ApplyReport::declined(&set), ApplyReport::default());
        assert_eq!(
            ApplyReport::declined(&ChangeSet::default()),
            ApplyReport::default()
        );
    }
}
