// src/classify/mod.rs

//! Two-stage file classification.
//!
//! The cheap extension/size stage runs during traversal and decides which
//! files are even worth reading. The content stage runs only at read time, on
//! files the first stage called "text": decode failure or a long run of
//! control/extended characters demotes the file to binary and its content is
//! discarded. Demotion is never a hard error.

use crate::constants::{
    BINARY_EXTENSIONS, BINARY_RUN_THRESHOLD, MAX_FILE_SIZE_BYTES, SNIFF_EXEMPT_EXTENSIONS,
    SPECIAL_EXTENSIONS,
};
use content_inspector::ContentType;
use std::path::Path;

/// Outcome of the extension/size pre-check for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Never load content; kept in listings with `error` explaining why.
    pub is_skipped: bool,
    /// Binary by extension. Text classification is provisional until content
    /// is actually read.
    pub is_binary: bool,
    /// Uppercased extension, or `TEXT`/`BINARY` fallback labels.
    pub file_type: String,
    /// Human-readable skip reason, if any.
    pub error: Option<String>,
}

/// Classifies a file from its path and stat size. First match wins:
/// oversized, special extension, binary extension, then provisional text.
pub fn classify(path: &Path, size: u64) -> Classification {
    let ext = extension_of(path);
    let ext_ref = ext.as_deref();

    if size > MAX_FILE_SIZE_BYTES {
        return Classification {
            is_skipped: true,
            is_binary: false,
            file_type: file_type_label(ext_ref, false),
            error: Some("File too large to process".to_string()),
        };
    }

    if matches!(ext_ref, Some(e) if SPECIAL_EXTENSIONS.contains(&e)) {
        return Classification {
            is_skipped: true,
            is_binary: true,
            file_type: file_type_label(ext_ref, true),
            error: Some("Special file type skipped".to_string()),
        };
    }

    if matches!(ext_ref, Some(e) if BINARY_EXTENSIONS.contains(e)) {
        return Classification {
            is_skipped: false,
            is_binary: true,
            file_type: file_type_label(ext_ref, true),
            error: None,
        };
    }

    Classification {
        is_skipped: false,
        is_binary: false,
        file_type: file_type_label(ext_ref, false),
        error: None,
    }
}

/// Lowercased extension of a path, if it has one.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn file_type_label(extension: Option<&str>, is_binary: bool) -> String {
    match extension {
        Some(ext) if !ext.is_empty() => ext.to_ascii_uppercase(),
        _ if is_binary => "BINARY".to_string(),
        _ => "TEXT".to_string(),
    }
}

/// Attempts to decode raw bytes as text.
///
/// Returns `None` when the byte-level inspection says binary or the bytes are
/// not valid UTF-8; the caller treats `None` as a binary demotion.
pub fn decode_text(bytes: &[u8]) -> Option<String> {
    match content_inspector::inspect(bytes) {
        ContentType::BINARY => None,
        _ => String::from_utf8(bytes.to_vec()).ok(),
    }
}

/// Content sniff over already-decoded text: 50+ consecutive control or
/// extended characters (outside tab/LF/CR) flag the content as binary.
///
/// Skipped for the configured exempt extensions, where embedded escape
/// sequences would trip the heuristic on legitimate source.
pub fn sniff_binary_text(text: &str, extension: Option<&str>) -> bool {
    if matches!(extension, Some(e) if SNIFF_EXEMPT_EXTENSIONS.contains(&e)) {
        return false;
    }

    let mut run = 0usize;
    for ch in text.chars() {
        let suspicious = match ch {
            '\t' | '\n' | '\r' => false,
            c if (c as u32) < 0x20 => true,
            c => {
                let code = c as u32;
                (0x7F..=0xFF).contains(&code)
            }
        };
        if suspicious {
            run += 1;
            if run >= BINARY_RUN_THRESHOLD {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_oversized_file_skipped() {
        let c = classify(&PathBuf::from("big.txt"), MAX_FILE_SIZE_BYTES + 1);
        assert!(c.is_skipped);
        assert!(!c.is_binary);
        assert_eq!(c.error.as_deref(), Some("File too large to process"));
    }

    #[test]
    fn test_file_exactly_at_limit_is_kept() {
        let c = classify(&PathBuf::from("big.txt"), MAX_FILE_SIZE_BYTES);
        assert!(!c.is_skipped);
    }

    #[test]
    fn test_special_extension_skipped_as_binary() {
        let c = classify(&PathBuf::from("native.dll"), 10);
        assert!(c.is_skipped);
        assert!(c.is_binary);
        assert_eq!(c.error.as_deref(), Some("Special file type skipped"));
        assert_eq!(c.file_type, "DLL");
    }

    #[test]
    fn test_binary_extension_kept_but_binary() {
        let c = classify(&PathBuf::from("photo.PNG"), 10);
        assert!(!c.is_skipped);
        assert!(c.is_binary);
        assert_eq!(c.file_type, "PNG");
    }

    #[test]
    fn test_text_extension_provisional() {
        let c = classify(&PathBuf::from("src/main.rs"), 10);
        assert!(!c.is_skipped);
        assert!(!c.is_binary);
        assert_eq!(c.file_type, "RS");
    }

    #[test]
    fn test_no_extension_labelled_text() {
        let c = classify(&PathBuf::from("Makefile"), 10);
        assert_eq!(c.file_type, "TEXT");
    }

    #[test]
    fn test_decode_rejects_nul_bytes() {
        assert!(decode_text(b"has a \0 byte").is_none());
        assert_eq!(decode_text(b"plain text").as_deref(), Some("plain text"));
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        assert!(decode_text(&[0x48, 0x65, 0x80, 0x6f]).is_none());
    }

    #[test]
    fn test_sniff_flags_long_control_run() {
        let mut text = String::from("header");
        text.extend(std::iter::repeat('\u{1b}').take(BINARY_RUN_THRESHOLD));
        assert!(sniff_binary_text(&text, Some("txt")));
    }

    #[test]
    fn test_sniff_run_reset_by_normal_chars() {
        let mut text = String::new();
        for _ in 0..100 {
            text.push('\u{1b}');
            text.push('a');
        }
        assert!(!sniff_binary_text(&text, Some("txt")));
    }

    #[test]
    fn test_sniff_ignores_tabs_and_newlines() {
        let text = "\t\n\r".repeat(100);
        assert!(!sniff_binary_text(&text, Some("txt")));
    }

    #[test]
    fn test_sniff_exempts_js() {
        let text = "\u{1b}".repeat(BINARY_RUN_THRESHOLD * 2);
        assert!(sniff_binary_text(&text, Some("txt")));
        assert!(!sniff_binary_text(&text, Some("js")));
    }
}
