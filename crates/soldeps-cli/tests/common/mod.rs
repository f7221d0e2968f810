//! Common test utilities shared across integration tests.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Get the workspace root directory
pub fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    // Go up from crates/soldeps-cli to workspace root
    manifest_dir
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
}

/// Path of the binary cargo built for this test run
pub fn get_soldeps_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_soldeps"))
}

/// Run the soldeps binary in the specified directory with colors disabled
pub fn run_soldeps_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(get_soldeps_binary())
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute soldeps binary")
}

/// Write a file into the test directory
pub fn write_file(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).expect("Failed to write test file");
}
