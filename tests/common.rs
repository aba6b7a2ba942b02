// tests/common.rs

use std::path::Path;
use std::process::Command;

// Helper function to get the binary command
#[allow(dead_code)] // Used by the CLI integration tests, but not all suites.
pub fn fsbundle_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("fsbundle"))
}

#[allow(dead_code)]
pub fn create_file(dir: &Path, relative: &str, content: &[u8]) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
}
