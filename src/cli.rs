// src/cli.rs

use crate::core_types::{FileTreeMode, LineRange, SelectionEntry};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Scan a workspace directory and bundle a selection of its files into a
/// single, security-checked text document.
///
/// fsbundle enumerates files under the given root (respecting .gitignore and
/// built-in exclusions), classifies them as text or binary, and concatenates
/// the selected ones — optionally restricted to line ranges — together with an
/// ASCII tree of the bundle, ready for pasting into downstream tools.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Root directory to scan and bundle from.
    #[arg(default_value = ".")]
    pub root: String,

    /// File to include, optionally with line ranges: PATH[:START-END[,START-END...]]
    /// (repeatable). Paths are validated against the workspace root.
    #[arg(short = 's', long = "select", value_name = "PATH[:RANGES]")]
    pub select: Vec<String>,

    /// How much file-tree context to render in the bundle.
    #[arg(long = "tree-mode", value_enum, default_value = "selected")]
    pub tree_mode: TreeModeArg,

    /// Exclude files/directories matching these glob patterns (gitignore
    /// syntax, relative to the root, repeatable).
    #[arg(short = 'i', long = "ignore", value_name = "GLOB")]
    pub ignore: Vec<String>,

    /// Stop including selected files beyond this count.
    #[arg(long, value_name = "N")]
    pub max_files: Option<usize>,

    /// Stop including selected files once decoded content exceeds this many bytes.
    #[arg(long, value_name = "BYTES")]
    pub max_bytes: Option<u64>,

    /// Instruction block rendered before the bundle (repeatable).
    #[arg(long = "prefix", value_name = "TEXT")]
    pub prefix: Vec<String>,

    /// Instruction block rendered after the bundle (repeatable).
    #[arg(long = "suffix", value_name = "TEXT")]
    pub suffix: Vec<String>,

    /// List discovered files (one relative path per line) instead of bundling.
    #[arg(short = 'l', long, action = clap::ArgAction::SetTrue)]
    pub list: bool,
}

/// CLI spelling of [`FileTreeMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TreeModeArg {
    None,
    Selected,
    Complete,
}

impl From<TreeModeArg> for FileTreeMode {
    fn from(arg: TreeModeArg) -> Self {
        match arg {
            TreeModeArg::None => FileTreeMode::None,
            TreeModeArg::Selected => FileTreeMode::Selected,
            TreeModeArg::Complete => FileTreeMode::Complete,
        }
    }
}

/// Parses one `--select` argument into a selection entry.
///
/// The range suffix is recognized only when everything after the last `:`
/// parses as ranges, so plain Windows paths (`C:\...`) stay intact.
pub fn parse_selection(raw: &str) -> SelectionEntry {
    if let Some((path, ranges)) = raw.rsplit_once(':') {
        if let Some(lines) = parse_ranges(ranges) {
            return SelectionEntry {
                path: PathBuf::from(path),
                lines: Some(lines),
            };
        }
    }
    SelectionEntry::whole(raw)
}

fn parse_ranges(raw: &str) -> Option<Vec<LineRange>> {
    let mut ranges = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        let (start, end) = match part.split_once('-') {
            Some((a, b)) => (a.parse().ok()?, b.parse().ok()?),
            None => {
                let line: usize = part.parse().ok()?;
                (line, line)
            }
        };
        if start == 0 || end < start {
            return None;
        }
        ranges.push(LineRange { start, end });
    }
    if ranges.is_empty() {
        None
    } else {
        Some(ranges)
    }
}
