// src/scanner/state.rs

//! Explicit scheduler state for one traversal.
//!
//! Each scheduling step is a function of this state plus a batch sink; no
//! closures hold hidden traversal state. The queue is owned by one traversal
//! for its duration and discarded on completion or cancellation.

use crate::classify::classify;
use crate::core_types::{FileBatch, FileRecord};
use crate::ignore_rules::IgnoreFilter;
use crate::scanner::ScanLimits;
use log::{trace, warn};
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

/// Transient unit of traversal work.
#[derive(Debug, Clone)]
pub(crate) struct DirEnqueued {
    pub path: PathBuf,
    pub depth: usize,
}

/// Mutable state threaded through scheduling steps.
#[derive(Debug)]
pub(crate) struct ScanState {
    pub queue: VecDeque<DirEnqueued>,
    /// Canonicalized directories already listed; defends against symlink
    /// cycles and duplicate enqueues.
    pub visited: HashSet<PathBuf>,
    /// Files accumulated toward the current batch.
    pub pending: Vec<FileRecord>,
    pub pending_bytes: u64,
    /// Directories deeper than this are requeued instead of listed. Raised by
    /// the driver when a step makes no progress, so traversal still completes.
    pub allowed_depth: usize,
}

impl ScanState {
    pub fn seed(root: PathBuf, limits: &ScanLimits) -> Self {
        let mut queue = VecDeque::new();
        queue.push_back(DirEnqueued {
            path: root,
            depth: 0,
        });
        Self {
            queue,
            visited: HashSet::new(),
            pending: Vec::new(),
            pending_bytes: 0,
            allowed_depth: limits.max_depth,
        }
    }

    fn take_batch(&mut self, is_complete: bool) -> FileBatch {
        self.pending_bytes = 0;
        FileBatch {
            files: std::mem::take(&mut self.pending),
            is_complete,
        }
    }
}

/// What one scheduling step accomplished.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum StepStatus {
    /// At least one directory was listed.
    Progress,
    /// Every examined directory was over the depth allowance and got requeued.
    Stalled,
    /// The queue is empty; traversal is done.
    Exhausted,
    /// The batch sink refused a batch (consumer went away).
    Aborted,
}

/// Runs one scheduling step: lists up to `max_dirs_per_step` queued
/// directories in ascending depth order, enqueues subdirectories, classifies
/// files, and emits batches through `emit` as the byte budget fills.
///
/// Unreadable directories and files are logged and skipped; they never abort
/// the step.
pub(crate) fn run_step(
    state: &mut ScanState,
    root: &Path,
    filter: &IgnoreFilter,
    limits: &ScanLimits,
    emit: &mut dyn FnMut(FileBatch) -> bool,
) -> StepStatus {
    let budget = state.queue.len().min(limits.max_dirs_per_step);
    let mut processed = 0usize;

    for _ in 0..budget {
        let Some(item) = state.queue.pop_front() else {
            break;
        };

        if item.depth > state.allowed_depth {
            // Requeued, not dropped: depth bounds per-step work, not the
            // traversal as a whole.
            trace!(
                "Requeueing over-depth directory ({} > {}): {}",
                item.depth,
                state.allowed_depth,
                item.path.display()
            );
            state.queue.push_back(item);
            continue;
        }

        let canonical = match fs::canonicalize(&item.path) {
            Ok(c) => c,
            Err(e) => {
                warn!(
                    "Skipping unreadable directory '{}': {}",
                    item.path.display(),
                    e
                );
                continue;
            }
        };
        if !state.visited.insert(canonical) {
            trace!("Already visited, skipping: {}", item.path.display());
            continue;
        }

        if !list_directory(state, &item, root, filter, limits, emit) {
            return StepStatus::Aborted;
        }
        processed += 1;
    }

    if state.queue.is_empty() {
        StepStatus::Exhausted
    } else if processed == 0 {
        StepStatus::Stalled
    } else {
        StepStatus::Progress
    }
}

/// Emits the final batch, flushing any accumulated files.
pub(crate) fn flush_terminal(state: &mut ScanState, emit: &mut dyn FnMut(FileBatch) -> bool) {
    let batch = state.take_batch(true);
    emit(batch);
}

fn list_directory(
    state: &mut ScanState,
    item: &DirEnqueued,
    root: &Path,
    filter: &IgnoreFilter,
    limits: &ScanLimits,
    emit: &mut dyn FnMut(FileBatch) -> bool,
) -> bool {
    let entries = match fs::read_dir(&item.path) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(
                "Skipping unreadable directory '{}': {}",
                item.path.display(),
                e
            );
            return true;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(
                    "Skipping unreadable entry in '{}': {}",
                    item.path.display(),
                    e
                );
                continue;
            }
        };
        let path = entry.path();

        // Resolve symlinks so a linked file is still classified as a file and
        // a linked directory goes through the visited-set guard.
        let metadata = match fs::metadata(&path) {
            Ok(md) => md,
            Err(e) => {
                warn!("Skipping entry '{}': {}", path.display(), e);
                continue;
            }
        };

        let relative = path.strip_prefix(root).unwrap_or(&path);
        if filter.ignores(relative, metadata.is_dir()) {
            trace!("Ignored: {}", relative.display());
            continue;
        }

        if metadata.is_dir() {
            state.queue.push_back(DirEnqueued {
                path,
                depth: item.depth + 1,
            });
            continue;
        }
        if !metadata.is_file() {
            continue;
        }

        let classification = classify(&path, metadata.len());
        let record = FileRecord {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
            size: metadata.len(),
            mtime: metadata.modified().ok(),
            is_directory: false,
            is_binary: classification.is_binary,
            is_skipped: classification.is_skipped,
            file_type: classification.file_type,
            error: classification.error,
            excluded_by_default: false,
            content: None,
            is_content_loaded: false,
        };

        state.pending_bytes += record.size.min(crate::constants::MAX_FILE_SIZE_BYTES);
        state.pending.push(record);

        let full_by_count = state.pending.len() >= limits.max_batch_files;
        let full_by_bytes = state.pending.len() >= limits.min_batch_files
            && state.pending_bytes >= limits.batch_target_bytes;
        if full_by_count || full_by_bytes {
            let batch = state.take_batch(false);
            if !emit(batch) {
                return false;
            }
        }
    }

    true
}
