//! `fsbundle` scans a workspace directory under resource and security limits,
//! classifies each file (text/binary/oversized/special), and assembles a
//! bounded, security-checked textual bundle from a chosen subset of those
//! files — ready for pasting into tools that consume plain text, such as
//! Large Language Models.
//!
//! The pipeline has three cooperating stages:
//! 1. **Validate**: every path is checked against the process-wide workspace
//!    roots before any filesystem call ([`validate_path`],
//!    [`set_workspace_roots`]).
//! 2. **Scan**: a breadth-oriented, cancellable traversal streams batches of
//!    classified [`FileRecord`]s, sized to a byte budget ([`scan`]).
//! 3. **Aggregate**: a caller-supplied selection (paths, optionally with line
//!    ranges) is loaded, pruned of anything that cannot be safely included,
//!    and rendered with an ASCII tree ([`aggregate`]).
//!
//! # Example
//!
//! ```
//! use fsbundle::{aggregate, AggregateParams, CancellationToken, SelectionEntry};
//! use std::fs;
//! use tempfile::tempdir;
//!
//! let workspace = tempdir().unwrap();
//! fs::write(workspace.path().join("notes.txt"), "alpha").unwrap();
//!
//! let params = AggregateParams::new(
//!     workspace.path(),
//!     vec![SelectionEntry::whole(workspace.path().join("notes.txt"))],
//! );
//! let token = CancellationToken::new();
//!
//! let result = aggregate(&params, &token).unwrap();
//! assert_eq!(result.file_count, 1);
//! assert!(result.content.contains("alpha"));
//! ```

pub mod aggregate;
pub mod cancellation;
pub mod classify;
pub mod cli;
pub mod constants;
pub mod core_types;
pub mod errors;
pub mod ignore_rules;
pub mod scanner;
pub mod security;
pub mod signal;
pub mod tree;

// Re-export the key public types and entry points for library use.
pub use aggregate::{aggregate, AggregateLimits, AggregateParams, Instructions};
pub use cancellation::CancellationToken;
pub use core_types::{
    AggregationResult, FileBatch, FileRecord, FileTreeMode, LineRange, SelectionEntry,
};
pub use errors::{Error, Result};
pub use ignore_rules::IgnoreFilter;
pub use scanner::{scan, ScanHandle, ScanLimits};
pub use security::{
    set_workspace_roots, validate_path, workspace_roots, PathValidation, RejectReason,
};
pub use tree::{build_tree, TreePath};
