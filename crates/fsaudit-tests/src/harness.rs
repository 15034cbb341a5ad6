//! Test harness: scratch directories for filesystem-touching tests

use std::path::Path;

use tempfile::TempDir;

/// A named scratch environment backed by a temp directory that is removed
/// on drop.
#[derive(Debug)]
pub struct TestEnv {
    temp_dir: TempDir,
    test_name: String,
}

impl TestEnv {
    /// Create a fresh scratch environment
    pub fn new(test_name: &str) -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        Self {
            temp_dir,
            test_name: test_name.to_string(),
        }
    }

    /// Root of the scratch directory
    pub fn tempdir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Name the environment was created under
    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    /// Write a file under the scratch directory and return its path
    pub fn write_file(&self, name: &str, contents: &str) -> std::path::PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, contents).expect("failed to write test file");
        path
    }
}
