// src/aggregate/mod.rs

//! Builds the final bundle from a caller-supplied selection.
//!
//! Every selection path is re-validated through the security boundary before
//! any I/O (the caller is expected to have validated already; this component
//! does not trust that). Entries that cannot be safely included — invalid
//! path, missing file, binary, undecodable — are pruned silently, never
//! rendered as placeholders.

use crate::cancellation::CancellationToken;
use crate::classify::{classify, decode_text, extension_of, sniff_binary_text};
use crate::core_types::{AggregationResult, FileRecord, FileTreeMode, SelectionEntry};
use crate::errors::{Error, Result};
use crate::ignore_rules::IgnoreFilter;
use crate::scanner::{scan_to_end, validate_root, ScanLimits};
use crate::security::validate_path;
use log::{debug, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

mod render;

/// Optional aggregate caps. Inclusion is first-include-wins in universe
/// iteration order; callers needing priority must pre-sort the selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregateLimits {
    /// Stop including selected files beyond this count.
    pub max_files: Option<usize>,
    /// Stop including selected files once decoded bytes would exceed this.
    pub max_bytes: Option<u64>,
}

/// Opaque caller-supplied text blocks spliced around the file contents.
#[derive(Debug, Clone, Default)]
pub struct Instructions {
    pub prefix: Vec<String>,
    pub suffix: Vec<String>,
}

/// Everything one aggregation run needs.
#[derive(Debug, Clone)]
pub struct AggregateParams {
    /// Root directory the bundle is scoped to.
    pub root: PathBuf,
    /// Caller-chosen files, optionally with line ranges.
    pub selection: Vec<SelectionEntry>,
    /// How much tree context to render.
    pub file_tree_mode: FileTreeMode,
    pub limits: AggregateLimits,
    /// Extra exclusion patterns applied in "complete" tree mode.
    pub extra_ignore_patterns: Vec<String>,
    /// Renders the tree relative to this path instead of `root`.
    pub tree_root_override: Option<PathBuf>,
    pub instructions: Instructions,
}

impl AggregateParams {
    /// Params with defaults for everything but the root and selection.
    pub fn new<P: Into<PathBuf>>(root: P, selection: Vec<SelectionEntry>) -> Self {
        Self {
            root: root.into(),
            selection,
            file_tree_mode: FileTreeMode::default(),
            limits: AggregateLimits::default(),
            extra_ignore_patterns: Vec::new(),
            tree_root_override: None,
            instructions: Instructions::default(),
        }
    }
}

/// Runs one aggregation: validates the selection, builds the file universe,
/// loads and prunes content, and renders the bundle.
///
/// An empty selection, or one that fully prunes away, still succeeds with
/// `file_count = 0` and a "No files selected." body.
pub fn aggregate(
    params: &AggregateParams,
    token: &CancellationToken,
) -> Result<AggregationResult> {
    let root = validate_root(&params.root)?;
    let filter = IgnoreFilter::load(&root, &params.extra_ignore_patterns)?;

    let selection = validated_selection(&params.selection);

    let mut universe = match params.file_tree_mode {
        FileTreeMode::Complete => {
            let mut records = scan_to_end(&root, &filter, &ScanLimits::default(), token)?;
            // Selected files the scan never saw (outside the root) still need
            // records so their content can load.
            let seen: Vec<PathBuf> = records.iter().map(|r| r.path.clone()).collect();
            for entry in selection_records(&selection, &root, &filter) {
                if !seen.contains(&entry.path) {
                    records.push(entry);
                }
            }
            records
        }
        FileTreeMode::Selected | FileTreeMode::None => {
            selection_records(&selection, &root, &filter)
        }
    };

    let file_count = load_selected_content(&mut universe, &selection, &params.limits, token)?;

    // Guarantee the rendered output never references a selected file without
    // actual content.
    universe.retain(|record| !selection.contains_key(&record.path) || record.is_content_loaded);

    let content = render::render_bundle(&universe, &selection, params, &root, file_count);
    Ok(AggregationResult {
        content,
        file_count,
    })
}

/// Validates and canonicalizes the selection, dropping invalid entries
/// silently. First entry wins for duplicate paths.
fn validated_selection(selection: &[SelectionEntry]) -> HashMap<PathBuf, &SelectionEntry> {
    let mut validated: HashMap<PathBuf, &SelectionEntry> = HashMap::new();
    for entry in selection {
        let raw = entry.path.to_string_lossy();
        let checked = validate_path(&raw);
        let Some(sanitized) = checked.sanitized_path else {
            warn!(
                "Dropping selection entry '{}': {}",
                raw,
                checked
                    .reason
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "rejected".to_string())
            );
            continue;
        };
        // Canonicalization also drops entries that do not exist.
        let Ok(canonical) = fs::canonicalize(&sanitized) else {
            debug!("Dropping missing selection entry '{}'", sanitized);
            continue;
        };
        validated.entry(canonical).or_insert(entry);
    }
    validated
}

/// Stats each selected path individually into a `FileRecord` universe.
/// Directories in the selection are dropped; selection must reference files.
fn selection_records(
    selection: &HashMap<PathBuf, &SelectionEntry>,
    root: &Path,
    filter: &IgnoreFilter,
) -> Vec<FileRecord> {
    let mut records: Vec<FileRecord> = Vec::with_capacity(selection.len());
    for path in selection.keys() {
        let metadata = match fs::metadata(path) {
            Ok(md) => md,
            Err(e) => {
                debug!("Dropping unstat-able selection entry '{}': {}", path.display(), e);
                continue;
            }
        };
        if metadata.is_dir() {
            debug!("Dropping directory selection entry '{}'", path.display());
            continue;
        }

        let classification = classify(path, metadata.len());
        let excluded_by_default = path
            .strip_prefix(root)
            .map(|rel| filter.is_default_excluded(rel, false))
            .unwrap_or(false);

        records.push(FileRecord {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: path.clone(),
            size: metadata.len(),
            mtime: metadata.modified().ok(),
            is_directory: false,
            is_binary: classification.is_binary,
            is_skipped: classification.is_skipped,
            file_type: classification.file_type,
            error: classification.error,
            excluded_by_default,
            content: None,
            is_content_loaded: false,
        });
    }
    // Stat order of a HashMap is arbitrary; keep output deterministic.
    records.sort_by(|a, b| a.path.cmp(&b.path));
    records
}

/// Loads and decodes content for universe entries in the selection set.
/// Returns the number of entries whose content was included.
fn load_selected_content(
    universe: &mut [FileRecord],
    selection: &HashMap<PathBuf, &SelectionEntry>,
    limits: &AggregateLimits,
    token: &CancellationToken,
) -> Result<usize> {
    let mut included = 0usize;
    let mut included_bytes = 0u64;

    for record in universe.iter_mut() {
        if !selection.contains_key(&record.path) {
            continue;
        }
        // Binary-by-extension and skipped records never load content.
        if record.is_binary || record.is_skipped {
            continue;
        }
        if token.is_cancelled() {
            return Err(Error::Cancelled);
        }
        // Limits stop inclusion outright: once either budget would be
        // exceeded, later (even smaller) selected files stay unloaded.
        if let Some(max_files) = limits.max_files {
            if included >= max_files {
                break;
            }
        }
        if let Some(max_bytes) = limits.max_bytes {
            if included_bytes + record.size > max_bytes {
                break;
            }
        }

        let bytes = match fs::read(&record.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Dropping unreadable selection '{}': {}", record.path.display(), e);
                record.error = Some(e.to_string());
                continue;
            }
        };

        let extension = extension_of(&record.path);
        let Some(text) = decode_text(&bytes) else {
            debug!(
                "Demoting undecodable selection to binary: {}",
                record.path.display()
            );
            record.is_binary = true;
            continue;
        };
        if sniff_binary_text(&text, extension.as_deref()) {
            debug!(
                "Content sniff demoted '{}' to binary",
                record.path.display()
            );
            record.is_binary = true;
            continue;
        }

        included_bytes += text.len() as u64;
        included += 1;
        record.content = Some(text);
        record.is_content_loaded = true;
    }

    Ok(included)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::test_support::root_lock;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_selection_directories_are_dropped() {
        let _guard = root_lock();
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join("subdir")).unwrap();
        fs::write(temp.path().join("keep.txt"), "keep").unwrap();

        let params = AggregateParams::new(
            temp.path(),
            vec![
                SelectionEntry::whole(temp.path().join("subdir")),
                SelectionEntry::whole(temp.path().join("keep.txt")),
            ],
        );
        let result = aggregate(&params, &CancellationToken::new()).unwrap();
        assert_eq!(result.file_count, 1);
        assert!(result.content.contains("keep"));
        assert!(!result.content.contains("subdir"));
    }

    #[test]
    fn test_max_files_limit_is_first_include_wins() {
        let _guard = root_lock();
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.txt"), "alpha").unwrap();
        fs::write(temp.path().join("b.txt"), "bravo").unwrap();
        fs::write(temp.path().join("c.txt"), "charlie").unwrap();

        let mut params = AggregateParams::new(
            temp.path(),
            vec![
                SelectionEntry::whole(temp.path().join("a.txt")),
                SelectionEntry::whole(temp.path().join("b.txt")),
                SelectionEntry::whole(temp.path().join("c.txt")),
            ],
        );
        params.limits.max_files = Some(2);

        let result = aggregate(&params, &CancellationToken::new()).unwrap();
        assert_eq!(result.file_count, 2);
        // Universe iterates in path order, so a and b are the two included.
        assert!(result.content.contains("alpha"));
        assert!(result.content.contains("bravo"));
        assert!(!result.content.contains("charlie"));
    }

    #[test]
    fn test_max_bytes_limit_stops_inclusion() {
        let _guard = root_lock();
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.txt"), "0123456789").unwrap();
        fs::write(temp.path().join("b.txt"), "0123456789").unwrap();

        let mut params = AggregateParams::new(
            temp.path(),
            vec![
                SelectionEntry::whole(temp.path().join("a.txt")),
                SelectionEntry::whole(temp.path().join("b.txt")),
            ],
        );
        params.limits.max_bytes = Some(15);

        let result = aggregate(&params, &CancellationToken::new()).unwrap();
        assert_eq!(result.file_count, 1);
    }

    #[test]
    fn test_max_bytes_overflow_excludes_smaller_tail_too() {
        let _guard = root_lock();
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.txt"), "0123456789").unwrap();
        fs::write(temp.path().join("b.txt"), "0123456789").unwrap();
        fs::write(temp.path().join("c.txt"), "tail").unwrap();

        let mut params = AggregateParams::new(
            temp.path(),
            vec![
                SelectionEntry::whole(temp.path().join("a.txt")),
                SelectionEntry::whole(temp.path().join("b.txt")),
                SelectionEntry::whole(temp.path().join("c.txt")),
            ],
        );
        params.limits.max_bytes = Some(15);

        // b overflows the budget; c would fit, but inclusion has stopped.
        let result = aggregate(&params, &CancellationToken::new()).unwrap();
        assert_eq!(result.file_count, 1);
        assert!(!result.content.contains("tail"));
    }

    #[test]
    fn test_cancelled_aggregation_errors() {
        let _guard = root_lock();
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.txt"), "alpha").unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let params = AggregateParams::new(
            temp.path(),
            vec![SelectionEntry::whole(temp.path().join("a.txt"))],
        );
        assert!(matches!(
            aggregate(&params, &token),
            Err(Error::Cancelled)
        ));
    }
}
