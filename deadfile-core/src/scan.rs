//! Deterministic candidate file discovery with early directory pruning.
//!
//! Excluded directory names are checked in `WalkDir::filter_entry`, so an
//! excluded subtree (`node_modules/`, `.next/`, ...) is never descended into.
//! Test artifacts are filtered per file after the walk has reached them.
//!
//! Discovery never fails: unlistable directories become diagnostics and the
//! walk continues with the next entry.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::Diagnostic;
use crate::paths::path_to_normalized_string;

/// Directories excluded when the caller does not supply a list.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &["node_modules", ".next", ".git", "dist", "build"];

/// Extensions treated as candidates when the caller does not supply a list.
pub const DEFAULT_EXTENSIONS: &[&str] = &["tsx", "ts"];

/// Path segments that mark a test folder.
const TEST_DIR_PREFIXES: &[&str] = &["__tests__"];

/// Suffixes that mark a test or spec file (`button.test.tsx`) or folder
/// (`forms.test/`).
const TEST_STEM_SUFFIXES: &[&str] = &[".test", ".spec"];

/// A discovered source file eligible for classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// Absolute path as found on disk
    pub path: PathBuf,
    /// Normalized key used in every set operation
    pub key: String,
    /// Extension without the leading dot
    pub extension: String,
}

impl CandidateFile {
    /// Build a candidate from an absolute path.
    pub fn new(path: PathBuf) -> Self {
        let key = path_to_normalized_string(&path);
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            path,
            key,
            extension,
        }
    }

    /// File name (`page.tsx`).
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }
}

/// Result of a discovery walk.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Candidates in discovery order
    pub files: Vec<CandidateFile>,
    /// Directories that could not be listed
    pub diagnostics: Vec<Diagnostic>,
}

/// Strip a leading dot so `.ts` and `ts` compare equal.
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_string()
}

/// Checks if a directory entry should be pruned.
///
/// The walk root itself is never pruned, even if its name is excluded.
#[inline]
fn is_excluded_dir(entry: &walkdir::DirEntry, excludes: &HashSet<&str>) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| excludes.contains(name))
}

/// True when any segment of `relative` marks a test artifact.
///
/// Checked on the path relative to the walk root so that a project living
/// under e.g. `/home/me/__tests__/app` is not wholly excluded.
pub fn is_test_artifact(relative: &Path) -> bool {
    let in_test_dir = relative.parent().is_some_and(|dir| {
        dir.components().any(|c| {
            let seg = c.as_os_str().to_string_lossy();
            TEST_DIR_PREFIXES.iter().any(|p| seg.starts_with(p))
                || TEST_STEM_SUFFIXES.iter().any(|s| seg.ends_with(s))
        })
    });
    if in_test_dir {
        return true;
    }

    relative
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .is_some_and(|stem| TEST_STEM_SUFFIXES.iter().any(|s| stem.ends_with(s)))
}

/// Enumerate candidate files under `root`.
///
/// - `extensions`: accepted extensions, with or without leading dot
/// - `excluded_dirs`: directory names pruned wherever they appear
///
/// Files are returned in walk order (entries sorted by name within each
/// directory), which makes repeated runs over an unchanged tree identical.
pub fn discover_files<S: AsRef<str>>(
    root: &Path,
    extensions: &[S],
    excluded_dirs: &[S],
) -> Discovery {
    let accepted: HashSet<String> = extensions
        .iter()
        .map(|e| normalize_extension(e.as_ref()))
        .filter(|e| !e.is_empty())
        .collect();
    let excludes: HashSet<&str> = excluded_dirs.iter().map(|d| d.as_ref()).collect();

    let mut discovery = Discovery::default();

    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        // Prune before descending: excluded subtrees are never listed
        .filter_entry(|e| !is_excluded_dir(e, &excludes))
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                let path = e.path().map(Path::to_path_buf);
                warn!(
                    path = %path.as_deref().unwrap_or(root).display(),
                    error = %e,
                    "skipping unlistable directory"
                );
                discovery.diagnostics.push(Diagnostic::unlistable(path, e.to_string()));
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let ext_ok = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| accepted.contains(e));
        if !ext_ok {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        if is_test_artifact(relative) {
            debug!(path = %path.display(), "skipping test artifact");
            continue;
        }

        discovery.files.push(CandidateFile::new(path.to_path_buf()));
    }

    debug!(
        root = %root.display(),
        files = discovery.files.len(),
        errors = discovery.diagnostics.len(),
        "discovery finished"
    );
    discovery
}
