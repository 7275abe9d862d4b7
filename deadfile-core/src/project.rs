//! Project root detection.

use std::path::{Path, PathBuf};

/// Files whose presence marks a project root.
pub const PROJECT_MARKERS: &[&str] = &["package.json", "tsconfig.json"];

/// Whether `dir` directly contains a project marker.
pub fn is_project_root(dir: &Path) -> bool {
    PROJECT_MARKERS.iter().any(|m| dir.join(m).is_file())
}

/// Find the project root for `path`.
///
/// Checks `path` itself (or its directory, for a file) and then each
/// ancestor. Falls back to `path` made absolute when no marker is found.
pub fn find_project_root(path: &Path) -> PathBuf {
    let start = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let first = if start.is_file() {
        start.parent().map(Path::to_path_buf).unwrap_or_else(|| start.clone())
    } else {
        start.clone()
    };

    let mut current = Some(first.as_path());
    while let Some(dir) = current {
        if is_project_root(dir) {
            return dir.to_path_buf();
        }
        current = dir.parent();
    }

    start
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join("deadfile_project_test")
            .join(format!("{}_{}", name, std::process::id()));
        if dir.exists() {
            fs::remove_dir_all(&dir).ok();
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_finds_marker_upward() {
        let dir = temp_dir("upward");
        fs::write(dir.join("package.json"), "{}").unwrap();
        let nested = dir.join("src/components/ui");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_project_root(&nested), dir);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_file_argument_uses_its_directory() {
        let dir = temp_dir("file_arg");
        fs::write(dir.join("tsconfig.json"), "{}").unwrap();
        let file = dir.join("index.ts");
        fs::write(&file, "").unwrap();

        assert_eq!(find_project_root(&file), dir);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_is_project_root() {
        let dir = temp_dir("marker");
        assert!(!is_project_root(&dir));
        fs::write(dir.join("package.json"), "{}").unwrap();
        assert!(is_project_root(&dir));

        fs::remove_dir_all(&dir).ok();
    }
}
