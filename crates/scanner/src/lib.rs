//! # Context Scanner
//!
//! Builds a filtered, size-bounded snapshot of a project tree for use as
//! prompt context.
//!
//! ## Pipeline
//!
//! ```text
//! Directory
//!     │
//!     ├──> Walk (lexical order, excluded directories pruned)
//!     │
//!     ├──> Size cap
//!     │
//!     ├──> Path Filter (names, wildcards, extensions)
//!     │
//!     ├──> Content Classifier (NUL / UTF-8 sniff)
//!     │
//!     └──> ContextSnapshot (relative path → text)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use context_scanner::{ContextAssembler, ExclusionRuleSet};
//!
//! let snapshot = ContextAssembler::new(".", ExclusionRuleSet::default()).assemble()?;
//! for (path, content) in snapshot.iter() {
//!     println!("{path}: {} bytes", content.len());
//! }
//! # Ok::<(), context_scanner::ScanError>(())
//! ```

mod assembler;
mod classifier;
mod error;
mod path_filter;
mod rules;
mod snapshot;
mod stats;

pub use assembler::{assemble, ContextAssembler};
pub use classifier::{is_binary, is_binary_prefix, SNIFF_LEN};
pub use error::{Result, ScanError};
pub use path_filter::{should_exclude_directory, should_exclude_file, PathFilter};
pub use rules::{ExclusionRuleSet, DEFAULT_MAX_FILE_SIZE};
pub use snapshot::ContextSnapshot;
pub use stats::ScanStats;
