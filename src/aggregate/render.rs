// src/aggregate/render.rs

//! Final bundle rendering: instruction blocks, tree context, file blocks.

use crate::aggregate::AggregateParams;
use crate::core_types::{FileRecord, FileTreeMode, LineRange, SelectionEntry};
use crate::tree::{build_tree, TreePath, EMPTY_TREE_MESSAGE};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub(super) fn render_bundle(
    universe: &[FileRecord],
    selection: &HashMap<PathBuf, &SelectionEntry>,
    params: &AggregateParams,
    root: &Path,
    file_count: usize,
) -> String {
    let mut out = String::new();

    for block in &params.instructions.prefix {
        push_instruction_block(&mut out, block);
    }

    if params.file_tree_mode != FileTreeMode::None {
        let tree_root = params.tree_root_override.as_deref().unwrap_or(root);
        let tree_paths: Vec<TreePath> = universe
            .iter()
            .map(|record| TreePath {
                path: record.path.clone(),
                is_file: !record.is_directory,
            })
            .collect();
        out.push_str("## File Map\n```\n");
        out.push_str(&build_tree(&tree_paths, tree_root));
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("```\n\n");
    }

    if file_count == 0 {
        out.push_str(EMPTY_TREE_MESSAGE);
        out.push('\n');
    } else {
        let mut first_block = true;
        for record in universe {
            let Some(content) = record.content.as_deref() else {
                continue;
            };
            if !record.is_content_loaded {
                continue;
            }
            if !first_block {
                out.push('\n');
            }
            let lines = selection.get(&record.path).and_then(|e| e.lines.as_deref());
            push_file_block(&mut out, record, content, lines, root);
            first_block = false;
        }
    }

    for block in &params.instructions.suffix {
        out.push('\n');
        push_instruction_block(&mut out, block);
    }

    out
}

fn push_instruction_block(out: &mut String, block: &str) {
    out.push_str("<instructions>\n");
    out.push_str(block);
    if !block.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("</instructions>\n\n");
}

fn push_file_block(
    out: &mut String,
    record: &FileRecord,
    content: &str,
    lines: Option<&[LineRange]>,
    root: &Path,
) {
    let display = record
        .path
        .strip_prefix(root)
        .unwrap_or(&record.path)
        .to_string_lossy()
        .replace('\\', "/");

    out.push_str("## File: ");
    out.push_str(&display);
    if let Some(ranges) = lines {
        if !ranges.is_empty() {
            out.push_str(&format!(" (lines {})", describe_ranges(ranges)));
        }
    }
    out.push('\n');

    let hint = record.file_type.to_ascii_lowercase();
    let hint = if hint == "text" || hint == "binary" {
        ""
    } else {
        hint.as_str()
    };
    out.push_str("```");
    out.push_str(hint);
    out.push('\n');

    let body = match lines {
        Some(ranges) if !ranges.is_empty() => slice_ranges(content, ranges),
        _ => content.to_string(),
    };
    out.push_str(&body);
    if !body.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("```\n");
}

/// Cuts the requested 1-based inclusive ranges out of `content`. Out-of-bounds
/// ranges are clamped rather than erroring; fully out-of-range ones vanish.
fn slice_ranges(content: &str, ranges: &[LineRange]) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let mut selected: Vec<&str> = Vec::new();
    for range in ranges {
        let start = range.start.max(1);
        let end = range.end.min(lines.len());
        if start > end || start > lines.len() {
            continue;
        }
        selected.extend(&lines[start - 1..end]);
    }
    selected.join("\n")
}

fn describe_ranges(ranges: &[LineRange]) -> String {
    ranges
        .iter()
        .map(|r| {
            if r.start == r.end {
                r.start.to_string()
            } else {
                format!("{}-{}", r.start, r.end)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
