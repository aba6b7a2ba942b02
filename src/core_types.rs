//! Core data structures shared by the scanner and the aggregator.

use std::path::PathBuf;
use std::time::SystemTime;

/// A file visited during a scan or referenced by a selection.
///
/// Created by the scanner (or by the aggregator when stating a selection
/// directly); `content`/`is_content_loaded` are populated later, only for
/// records the aggregator decides to load, and only for non-directory,
/// non-binary, non-skipped records.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FileRecord {
    /// Base name of the file.
    pub name: String,
    /// Absolute path on the filesystem.
    pub path: PathBuf,
    /// Size in bytes from metadata.
    pub size: u64,
    /// Modification time, when the platform reports one.
    pub mtime: Option<SystemTime>,
    /// Always `false` for records emitted by the scanner; directories are
    /// traversal work, not output.
    pub is_directory: bool,
    /// Classified as binary (by extension, or demoted after a content sniff).
    pub is_binary: bool,
    /// Oversized or special file: kept in listings, content never loaded.
    pub is_skipped: bool,
    /// Uppercased extension, or `TEXT`/`BINARY` when there is none.
    pub file_type: String,
    /// Skip reason or per-entry I/O failure, if any.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub error: Option<String>,
    /// Matched one of the built-in exclusion patterns.
    pub excluded_by_default: bool,
    /// Decoded content, present only when `is_content_loaded` is `true`.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub content: Option<String>,
    /// Whether `content` holds the file's decoded text.
    pub is_content_loaded: bool,
}

/// One bounded unit of scan output.
///
/// Sized by byte budget rather than fixed file count; the terminal batch of a
/// completed scan carries `is_complete = true` (and may be empty).
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FileBatch {
    /// Files discovered since the previous batch. Order within a batch follows
    /// directory listing order and is not guaranteed stable across runs.
    pub files: Vec<FileRecord>,
    /// Set on the final batch once the traversal queue is empty.
    pub is_complete: bool,
}

/// An inclusive, 1-based line range inside a selected file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

/// A caller-chosen file to include in aggregated output, optionally restricted
/// to specific line ranges. Ranges affect rendering, not inclusion.
#[derive(Debug, Clone)]
pub struct SelectionEntry {
    /// Path to the file; validated against the workspace roots before any I/O.
    pub path: PathBuf,
    /// Optional line ranges; `None` means the whole file.
    pub lines: Option<Vec<LineRange>>,
}

impl SelectionEntry {
    /// Selects a whole file.
    pub fn whole<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            lines: None,
        }
    }
}

/// How much of the file universe the aggregator renders as tree context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileTreeMode {
    /// No tree section.
    None,
    /// Tree over the selected files only.
    #[default]
    Selected,
    /// Tree over a full scan of the root; content is still loaded only for
    /// selected files.
    Complete,
}

/// Output of one aggregation run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AggregationResult {
    /// The rendered bundle: tree context, file blocks, instruction blocks.
    pub content: String,
    /// Number of selection entries whose content was successfully loaded.
    /// Binary, missing, oversized, or undecodable selections are excluded,
    /// never represented as placeholders.
    pub file_count: usize,
}
