//! Scratch directories for tests that write netCDF or PNG files.

use std::path::PathBuf;

/// A fresh temporary directory, removed when dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("wx_gallery_")
        .tempdir()
        .expect("Failed to create temporary test directory")
}

/// Path of `name` inside `dir`, for files a test is about to create.
pub fn scratch_file(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_test_dir_is_prefixed() {
        let dir = temp_test_dir();
        assert!(dir.path().exists());
        let name = dir.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("wx_gallery_"));
    }

    #[test]
    fn test_scratch_file_stays_in_dir() {
        let dir = temp_test_dir();
        let path = scratch_file(&dir, "plot.png");
        assert_eq!(path.parent(), Some(dir.path()));
        assert!(!path.exists());
    }
}
