// src/scanner/mod.rs

//! Bounded-memory, cancellable directory traversal emitting batches of
//! classified file records.
//!
//! Traversal is breadth-oriented (shallow directories first) and stepped: each
//! scheduling step lists a bounded number of directories and yields after
//! emitting a batch, so one huge directory cannot starve the consumer or the
//! cancellation check. Batches are sized to a byte budget rather than a fixed
//! file count.

use crate::cancellation::CancellationToken;
use crate::constants::{
    BATCH_TARGET_BYTES, DEFAULT_MAX_DEPTH, MAX_BATCH_FILES, MAX_DIRS_PER_STEP, MIN_BATCH_FILES,
};
use crate::core_types::{FileBatch, FileRecord};
use crate::errors::{io_error_with_path, Error, Result};
use crate::ignore_rules::IgnoreFilter;
use crate::security::validate_path;
use crossbeam_channel::{unbounded, Receiver};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

mod state;

use state::{flush_terminal, run_step, ScanState, StepStatus};

/// Resource limits for one traversal. `Default` mirrors the crate constants.
#[derive(Debug, Clone)]
pub struct ScanLimits {
    /// Directories deeper than this are deferred to a later step.
    pub max_depth: usize,
    /// Maximum directories listed per scheduling step.
    pub max_dirs_per_step: usize,
    /// Byte budget that triggers a batch emit.
    pub batch_target_bytes: u64,
    /// A non-terminal batch holds at least this many files.
    pub min_batch_files: usize,
    /// A batch is emitted unconditionally at this many files.
    pub max_batch_files: usize,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_dirs_per_step: MAX_DIRS_PER_STEP,
            batch_target_bytes: BATCH_TARGET_BYTES,
            min_batch_files: MIN_BATCH_FILES,
            max_batch_files: MAX_BATCH_FILES,
        }
    }
}

/// Handle to a running scan: a batch stream plus a cancellation control.
#[derive(Debug)]
pub struct ScanHandle {
    receiver: Receiver<FileBatch>,
    token: CancellationToken,
}

impl ScanHandle {
    /// The stream of batches. Iterating drains until the terminal
    /// `is_complete` batch (or until cancellation stops emission).
    pub fn batches(&self) -> &Receiver<FileBatch> {
        &self.receiver
    }

    /// Cancels the scan. In-flight work finishes its current step; no batch
    /// is emitted afterwards.
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

/// Starts a scan of `root` on a background thread.
///
/// The root is validated through the security boundary and must be a
/// directory; this is the only failure that aborts a scan up front. Mid-scan
/// I/O errors are recovered per-entry and never fail the stream.
pub fn scan(
    root: &Path,
    extra_patterns: &[String],
    limits: ScanLimits,
    token: &CancellationToken,
) -> Result<ScanHandle> {
    let root = validate_root(root)?;
    let filter = IgnoreFilter::load(&root, extra_patterns)?;
    let (sender, receiver) = unbounded();
    let token = token.clone();

    let thread_token = token.clone();
    thread::spawn(move || {
        let mut scan_state = ScanState::seed(root.clone(), &limits);
        let mut emit = |batch: FileBatch| {
            let sent = sender.send(batch).is_ok();
            // Cooperative backpressure: give the consumer a turn after
            // every batch.
            thread::yield_now();
            sent
        };
        drive(&mut scan_state, &root, &filter, &limits, &thread_token, &mut emit);
        debug!("Scan thread for '{}' finished", root.display());
    });

    Ok(ScanHandle { receiver, token })
}

/// Runs a complete traversal on the calling thread, collecting every record.
/// Used by the aggregator's "complete" tree mode.
pub(crate) fn scan_to_end(
    root: &Path,
    filter: &IgnoreFilter,
    limits: &ScanLimits,
    token: &CancellationToken,
) -> Result<Vec<FileRecord>> {
    let mut records = Vec::new();
    let mut scan_state = ScanState::seed(root.to_path_buf(), limits);
    let mut emit = |batch: FileBatch| {
        records.extend(batch.files);
        true
    };
    if !drive(&mut scan_state, root, filter, limits, token, &mut emit) {
        return Err(Error::Cancelled);
    }
    Ok(records)
}

/// Steps the traversal to completion. Returns `false` on cancellation,
/// `true` once the terminal batch has been flushed (or the sink went away).
fn drive(
    scan_state: &mut ScanState,
    root: &Path,
    filter: &IgnoreFilter,
    limits: &ScanLimits,
    token: &CancellationToken,
    emit: &mut dyn FnMut(FileBatch) -> bool,
) -> bool {
    loop {
        // Checked at the start of every scheduling step; once cancelled, no
        // further batches are emitted.
        if token.is_cancelled() {
            debug!("Scan of '{}' cancelled", root.display());
            return false;
        }

        match run_step(scan_state, root, filter, limits, emit) {
            StepStatus::Exhausted => {
                flush_terminal(scan_state, emit);
                return true;
            }
            StepStatus::Stalled => {
                // Everything left is over-depth; raise the allowance so the
                // requeued directories are eventually listed.
                scan_state.allowed_depth += limits.max_depth.max(1);
            }
            StepStatus::Progress => {}
            StepStatus::Aborted => return true,
        }
    }
}

/// Validates the scan root through the security boundary and resolves it.
pub(crate) fn validate_root(root: &Path) -> Result<PathBuf> {
    let raw = root.to_string_lossy();
    let validation = validate_path(&raw);
    if !validation.valid {
        let reason = validation
            .reason
            .map(|r| r.to_string())
            .unwrap_or_else(|| "rejected".to_string());
        return Err(Error::InvalidRoot(format!("'{}': {}", raw, reason)));
    }

    let resolved = fs::canonicalize(root).map_err(|e| io_error_with_path(e, root))?;
    let metadata = fs::metadata(&resolved).map_err(|e| io_error_with_path(e, &resolved))?;
    if !metadata.is_dir() {
        return Err(Error::InvalidRoot(format!(
            "'{}' is not a directory",
            resolved.display()
        )));
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::test_support::root_lock;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_invalid_root_rejected_up_front() {
        let _guard = root_lock();
        let token = CancellationToken::new();
        let result = scan(
            Path::new("../outside"),
            &[],
            ScanLimits::default(),
            &token,
        );
        assert!(matches!(result, Err(Error::InvalidRoot(_))));
    }

    #[test]
    fn test_root_must_be_directory() {
        let _guard = root_lock();
        let temp = tempdir().unwrap();
        let file = temp.path().join("plain.txt");
        fs::write(&file, "x").unwrap();
        let token = CancellationToken::new();
        let result = scan(&file, &[], ScanLimits::default(), &token);
        assert!(matches!(result, Err(Error::InvalidRoot(_))));
    }

    #[test]
    fn test_terminal_batch_flags_completion() {
        let _guard = root_lock();
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.txt"), "a").unwrap();

        let token = CancellationToken::new();
        let handle = scan(temp.path(), &[], ScanLimits::default(), &token).unwrap();
        let batches: Vec<_> = handle.batches().iter().collect();
        assert!(batches.last().unwrap().is_complete);
        let total: usize = batches.iter().map(|b| b.files.len()).sum();
        assert_eq!(total, 1);
    }
}
