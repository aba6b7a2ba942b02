// src/security/mod.rs

//! Path security boundary.
//!
//! Every path the scanner or aggregator touches passes through
//! [`validate_path`] first. Validation is purely lexical: it never hits the
//! filesystem, never panics, and always returns a tagged [`PathValidation`]
//! rather than an error. The authorized workspace-root set is process-wide and
//! replaced wholesale via [`set_workspace_roots`]; a validation in flight sees
//! either the old set or the new one, never a partial swap.

use crate::constants::BLOCKED_SYSTEM_PATHS;
use log::warn;
use once_cell::sync::Lazy;
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Why a path was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum RejectReason {
    /// Empty input.
    InvalidInput,
    /// The raw string contained a `..` segment, a NUL byte, or a
    /// percent-encoded form of either.
    PathTraversalDetected,
    /// Lexical normalization failed (e.g. the path escapes its own anchor).
    PathResolutionFailed,
    /// Matched the deny-list of sensitive system paths (open mode only).
    BlockedPath,
    /// Workspace roots are configured and the path is under none of them.
    OutsideWorkspace,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RejectReason::InvalidInput => "INVALID_INPUT",
            RejectReason::PathTraversalDetected => "PATH_TRAVERSAL_DETECTED",
            RejectReason::PathResolutionFailed => "PATH_RESOLUTION_FAILED",
            RejectReason::BlockedPath => "BLOCKED_PATH",
            RejectReason::OutsideWorkspace => "OUTSIDE_WORKSPACE",
        };
        f.write_str(s)
    }
}

/// Result of validating one raw input path.
///
/// Never cached across calls: the root set can change between them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PathValidation {
    /// Whether the path may be used for filesystem access.
    pub valid: bool,
    /// The normalized, forward-slash path, present when `valid`.
    pub sanitized_path: Option<String>,
    /// The rejection reason, present when not `valid`.
    pub reason: Option<RejectReason>,
}

impl PathValidation {
    fn accepted(sanitized: String) -> Self {
        Self {
            valid: true,
            sanitized_path: Some(sanitized),
            reason: None,
        }
    }

    fn rejected(reason: RejectReason) -> Self {
        Self {
            valid: false,
            sanitized_path: None,
            reason: Some(reason),
        }
    }
}

// The one piece of shared mutable state in the crate. Readers take a cheap
// Arc clone; `set_workspace_roots` swaps the whole Arc under the write lock.
static WORKSPACE_ROOTS: Lazy<RwLock<Arc<Vec<String>>>> =
    Lazy::new(|| RwLock::new(Arc::new(Vec::new())));

/// Replaces the authorized workspace roots wholesale. Not additive: roots
/// granted before this call do not survive it.
///
/// Roots that fail lexical normalization are dropped with a warning.
pub fn set_workspace_roots<P: AsRef<Path>>(roots: &[P]) {
    let normalized: Vec<String> = roots
        .iter()
        .filter_map(|p| {
            let raw = p.as_ref().to_string_lossy();
            match normalize_lexical(&raw) {
                Some(n) => Some(n),
                None => {
                    warn!("Dropping workspace root that failed normalization: '{}'", raw);
                    None
                }
            }
        })
        .collect();

    let mut slot = WORKSPACE_ROOTS
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *slot = Arc::new(normalized);
}

/// Returns a snapshot of the current root set.
pub fn workspace_roots() -> Arc<Vec<String>> {
    WORKSPACE_ROOTS
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Validates and normalizes a raw path against the workspace roots.
///
/// Order of checks:
/// 1. empty input is rejected outright;
/// 2. traversal markers are rejected on the *raw* string, before
///    normalization, so encoded forms cannot slip through a normalizer;
/// 3. the path is lexically normalized;
/// 4. with roots configured, a path equal to a root or separator-nested under
///    one is accepted immediately (dotfiles inside a root are not special);
/// 5. with no roots configured (open mode), the deny-list of system paths is
///    consulted; anything else is accepted.
pub fn validate_path(raw: &str) -> PathValidation {
    if raw.is_empty() {
        return PathValidation::rejected(RejectReason::InvalidInput);
    }

    if has_traversal_markers(raw) {
        warn!("Rejecting path with traversal markers: '{}'", raw);
        return PathValidation::rejected(RejectReason::PathTraversalDetected);
    }

    let normalized = match normalize_lexical(raw) {
        Some(n) => n,
        None => return PathValidation::rejected(RejectReason::PathResolutionFailed),
    };

    let roots = workspace_roots();
    if !roots.is_empty() {
        if roots.iter().any(|root| is_within_root(&normalized, root)) {
            return PathValidation::accepted(normalized);
        }
        warn!("Rejecting path outside workspace roots: '{}'", normalized);
        return PathValidation::rejected(RejectReason::OutsideWorkspace);
    }

    // Open mode: no workspace is active. Anything not on the deny-list goes.
    if BLOCKED_SYSTEM_PATHS
        .iter()
        .any(|pattern| blocked_match(pattern, &normalized))
    {
        warn!("Rejecting blocked system path: '{}'", normalized);
        return PathValidation::rejected(RejectReason::BlockedPath);
    }

    PathValidation::accepted(normalized)
}

/// Checks the raw string for traversal attempts before any normalization.
fn has_traversal_markers(raw: &str) -> bool {
    if raw.contains('\0') {
        return true;
    }
    let lower = raw.to_ascii_lowercase();
    if lower.contains("%00") || lower.contains("%2e%2e") {
        return true;
    }
    raw.split(['/', '\\']).any(|segment| segment == "..")
}

/// Lexically normalizes a path: forward slashes, `.` segments resolved, `..`
/// segments popped (failing if they would escape the anchor), trailing slash
/// stripped. No filesystem access.
pub(crate) fn normalize_lexical(raw: &str) -> Option<String> {
    let forward = raw.replace('\\', "/");
    let absolute = forward.starts_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in forward.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                // Popping past the anchor means the path cannot be resolved
                // to anything inside it.
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    let normalized = if absolute {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    };
    Some(normalized)
}

/// Separator-bounded prefix match: equal to the root, or nested under
/// `root + '/'`. `/work/space2` is not inside `/work/space`.
fn is_within_root(path: &str, root: &str) -> bool {
    if path == root {
        return true;
    }
    if root.ends_with('/') {
        return path.starts_with(root);
    }
    path.len() > root.len() && path.starts_with(root) && path.as_bytes()[root.len()] == b'/'
}

/// Literal-prefix or simple `*` wildcard match against a deny-list pattern.
fn blocked_match(pattern: &str, path: &str) -> bool {
    if let Some(idx) = pattern.find('*') {
        let (head, tail) = pattern.split_at(idx);
        let tail = &tail[1..];
        return path.starts_with(head) && path.ends_with(tail) && path.len() >= pattern.len() - 1;
    }
    is_within_root(path, pattern)
}
