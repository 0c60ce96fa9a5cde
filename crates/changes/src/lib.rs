//! # Context Changes
//!
//! Turns generator output into file mutations without losing working-tree state.
//!
//! ## Pipeline
//!
//! ```text
//! Response text
//!     │
//!     ├──> Parser (`FILE:` marker + fenced block)
//!     │      └─> ChangeSet (parse order, duplicates collapsed on apply)
//!     │
//!     ├──> Diff preview against the live tree
//!     │
//!     ├──> Overwrite gate (confirmation)
//!     │
//!     └──> Executor
//!            ├─> <path>.bak backup of existing files
//!            ├─> atomic write (temp sibling + rename)
//!            └─> MutationOutcome per proposal
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use context_changes::{parse_change_set, AllowAll, ApplyOptions, MutationExecutor};
//!
//! let response = "FILE: a.py\n```python\nx = 2\n```\n";
//! let changes = parse_change_set(response);
//! if changes.is_empty() {
//!     println!("no changes proposed");
//! }
//!
//! let executor = MutationExecutor::new(".", ApplyOptions::default());
//! let report = executor.apply_all(&changes, &mut AllowAll);
//! println!("{} applied, {} failed", report.summary.applied(), report.summary.failed);
//! ```

mod diff;
mod error;
mod executor;
mod gate;
mod outcome;
mod parser;
mod proposal;

pub use diff::{diff, FileDiff, CONTEXT_RADIUS};
pub use error::{ChangeError, Result};
pub use executor::{backup_path_for, ApplyOptions, MutationExecutor, Preview};
pub use gate::{AllowAll, DenyAll, OverwriteGate};
pub use outcome::{ApplyReport, ApplySummary, MutationOutcome, OutcomeStatus, SkipReason};
pub use parser::{extract_single_file, parse_change_set};
pub use proposal::{ChangeProposal, ChangeSet, ResolvedChange};
