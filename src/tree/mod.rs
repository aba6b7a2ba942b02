// src/tree/mod.rs

//! Renders a hierarchical ASCII tree of a path set relative to a root.
//!
//! Directories sort before files at every level; siblings of the same kind
//! sort lexicographically. Paths outside the root are excluded.

use crate::security::normalize_lexical;
use std::collections::BTreeMap;
use std::path::Path;

/// Message rendered for an empty path set.
pub const EMPTY_TREE_MESSAGE: &str = "No files selected.";

/// One input path for the tree, tagged with whether it is a file.
#[derive(Debug, Clone)]
pub struct TreePath {
    pub path: std::path::PathBuf,
    pub is_file: bool,
}

#[derive(Debug, Default)]
struct Node {
    children: BTreeMap<String, Node>,
    is_file: bool,
}

impl Node {
    fn insert(&mut self, segments: &[&str], is_file: bool) {
        let Some((first, rest)) = segments.split_first() else {
            return;
        };
        let child = self.children.entry((*first).to_string()).or_default();
        if rest.is_empty() {
            // Last writer wins for the terminal segment; the input list is
            // authoritative per call.
            child.is_file = is_file;
        } else {
            child.insert(rest, is_file);
        }
    }
}

/// Builds the rendered tree for `paths` relative to `root`.
pub fn build_tree(paths: &[TreePath], root: &Path) -> String {
    let root_str = match normalize_lexical(&root.to_string_lossy()) {
        Some(s) => s,
        None => return EMPTY_TREE_MESSAGE.to_string(),
    };

    let mut top = Node::default();
    for entry in paths {
        let Some(normalized) = normalize_lexical(&entry.path.to_string_lossy()) else {
            continue;
        };
        let Some(relative) = relative_segments(&normalized, &root_str) else {
            continue;
        };
        if relative.is_empty() {
            continue;
        }
        top.insert(&relative, entry.is_file);
    }

    if top.children.is_empty() {
        return EMPTY_TREE_MESSAGE.to_string();
    }

    let mut out = String::new();
    render_children(&top, "", &mut out);
    out
}

/// Root-relative segments, or `None` when the path is not under the root.
fn relative_segments<'a>(path: &'a str, root: &str) -> Option<Vec<&'a str>> {
    let rest = if path == root {
        ""
    } else if root == "/" {
        path.strip_prefix('/')?
    } else {
        path.strip_prefix(root)?.strip_prefix('/')?
    };
    Some(rest.split('/').filter(|s| !s.is_empty()).collect())
}

fn render_children(node: &Node, prefix: &str, out: &mut String) {
    // BTreeMap gives lexicographic order; partition keeps directories first.
    let mut ordered: Vec<(&String, &Node)> = Vec::with_capacity(node.children.len());
    ordered.extend(node.children.iter().filter(|(_, n)| !n.is_file));
    ordered.extend(node.children.iter().filter(|(_, n)| n.is_file));

    let last_index = ordered.len().saturating_sub(1);
    for (index, (name, child)) in ordered.into_iter().enumerate() {
        let connector = if index == last_index { "└── " } else { "├── " };
        out.push_str(prefix);
        out.push_str(connector);
        out.push_str(name);
        out.push('\n');

        if !child.children.is_empty() {
            let continuation = if index == last_index { "    " } else { "│   " };
            let child_prefix = format!("{}{}", prefix, continuation);
            render_children(child, &child_prefix, out);
        }
    }
}
