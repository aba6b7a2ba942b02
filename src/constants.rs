// src/constants.rs

//! Tunable limits and the built-in classification/exclusion tables.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Files larger than this are skipped entirely; a file exactly at the limit is kept.
pub const MAX_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;

/// Target byte budget for one scan batch. Batches of many small files and
/// batches of few large files both reach the consumer at a similar cadence.
pub const BATCH_TARGET_BYTES: u64 = 200 * 1024;

/// A batch is never emitted with fewer files than this (unless terminal).
pub const MIN_BATCH_FILES: usize = 10;

/// A batch is emitted once it holds this many files, regardless of byte total.
pub const MAX_BATCH_FILES: usize = 500;

/// Maximum number of directories one scheduling step will list.
pub const MAX_DIRS_PER_STEP: usize = 64;

/// Directories deeper than this are requeued for a later step instead of
/// being processed immediately.
pub const DEFAULT_MAX_DEPTH: usize = 20;

/// Length of a control/extended-character run that demotes decoded text to binary.
pub const BINARY_RUN_THRESHOLD: usize = 50;

/// Extensions exempt from the content sniff. Minified source routinely embeds
/// long escape-sequence runs that trip the heuristic.
pub const SNIFF_EXEMPT_EXTENSIONS: &[&str] = &["js"];

/// Archive/executable/native-module extensions that are never worth touching.
pub const SPECIAL_EXTENSIONS: &[&str] = &["asar", "bin", "dll", "exe", "so", "dylib"];

/// Extensions classified as binary without reading content. These records are
/// kept for tree display but their content is never loaded.
pub static BINARY_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // Images
        "jpg", "jpeg", "png", "gif", "bmp", "webp", "ico", "tif", "tiff", "heic", "psd",
        // Audio / video
        "mp3", "wav", "ogg", "flac", "aac", "m4a", "mp4", "avi", "mkv", "mov", "wmv", "webm",
        // Archives
        "zip", "tar", "gz", "tgz", "bz2", "xz", "7z", "rar", "zst",
        // Office / documents
        "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "ods", "odp",
        // Executables and installers
        "exe", "dll", "so", "dylib", "bin", "msi", "app", "deb", "rpm",
        // Fonts
        "ttf", "otf", "woff", "woff2", "eot",
        // Databases
        "db", "sqlite", "sqlite3", "mdb",
        // Compiled artifacts
        "o", "a", "obj", "lib", "class", "pyc", "pyo", "wasm", "jar", "war", "swf",
    ]
    .into_iter()
    .collect()
});

/// Built-in exclusion patterns added to every ignore filter, after the root's
/// own ignore file. Gitignore syntax, all additive deny rules.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    // Dependency directories
    "node_modules/",
    "bower_components/",
    "vendor/",
    ".venv/",
    "venv/",
    "__pycache__/",
    // VCS metadata
    ".git/",
    ".svn/",
    ".hg/",
    // Build output
    "target/",
    "dist/",
    "build/",
    "out/",
    ".next/",
    ".cache/",
    "coverage/",
    // Lockfiles
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "Cargo.lock",
    "Gemfile.lock",
    "composer.lock",
    // Editor / OS metadata
    ".idea/",
    ".vscode/",
    ".DS_Store",
    "Thumbs.db",
    "*.swp",
    // Common binary/document payloads not worth listing
    "*.min.js",
    "*.map",
    "*.pdf",
    "*.zip",
    "*.tar.gz",
    "*.jar",
    "*.class",
    "*.pyc",
];

/// Sensitive system prefixes rejected when no workspace roots are configured.
/// Literal prefixes plus simple `*` wildcards, matched against the
/// forward-slash-normalized path.
pub const BLOCKED_SYSTEM_PATHS: &[&str] = &[
    "/etc",
    "/proc",
    "/sys",
    "/dev",
    "/boot",
    "/root",
    "/var/log",
    "/private/etc",
    "C:/Windows*",
    "C:/Program Files*",
    "C:/ProgramData*",
];
