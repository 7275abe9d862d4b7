//! Builder pattern API for deadfile analysis.
//!
//! Provides a fluent interface for configuring and running the
//! unreferenced-file analysis:
//!
//! ```rust,ignore
//! use deadfile_core::prelude::*;
//!
//! let result = Deadfile::new("/path/to/project")
//!     .extensions(["tsx", "ts"])
//!     .exclude_dirs(["node_modules", "dist"])
//!     .jobs(8)
//!     .analyze()?;
//!
//! for file in &result.unreferenced {
//!     println!("Unreferenced: {}", file);
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use crate::alias::load_alias_table;
use crate::detect::{classify, FrameworkConventions};
use crate::error::{DeadfileError, DeadfileResult, Diagnostic};
use crate::extract::ImportExtractor;
use crate::orchestrator::{collect_references, default_jobs, CancelToken, PoolSettings, UnitContext};
use crate::paths::{parent_key, path_to_normalized_string, relative_key};
use crate::resolve::PathResolver;
use crate::scan::{discover_files, normalize_extension, DEFAULT_EXCLUDED_DIRS, DEFAULT_EXTENSIONS};

/// Inputs of one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Project root
    pub root: PathBuf,

    /// Candidate extensions, in resolution order
    pub extensions: Vec<String>,

    /// Directory names pruned wherever they appear
    pub excluded_dirs: Vec<String>,

    /// Explicit alias config file; `None` probes tsconfig.json then jsconfig.json
    pub alias_config: Option<PathBuf>,

    /// Worker threads
    pub jobs: usize,

    /// Minimum units per worker split
    pub batch_size: usize,

    /// Framework-exempt file names on top of the built-in set
    pub exempt_names: Vec<String>,
}

impl AnalysisOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
            alias_config: None,
            jobs: default_jobs(),
            batch_size: 1,
            exempt_names: Vec::new(),
        }
    }

    /// Reject settings no run can use.
    pub fn validate(&self) -> DeadfileResult<()> {
        if self.jobs == 0 {
            return Err(DeadfileError::invalid_argument("jobs must be at least 1"));
        }
        if self
            .extensions
            .iter()
            .all(|e| normalize_extension(e).is_empty())
        {
            return Err(DeadfileError::invalid_argument(
                "at least one file extension is required",
            ));
        }
        Ok(())
    }
}

/// Builder for configuring an analysis.
///
/// # Example
///
/// ```rust,ignore
/// let result = Deadfile::new("/my/project")
///     .alias_config("tsconfig.app.json")
///     .exempt_names(["template.tsx"])
///     .analyze()?;
/// ```
#[derive(Debug, Clone)]
pub struct Deadfile {
    options: AnalysisOptions,
    cancel: CancelToken,
}

impl Deadfile {
    /// Create a new analysis builder for the given path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::from_options(AnalysisOptions::new(root))
    }

    pub fn from_options(options: AnalysisOptions) -> Self {
        Self {
            options,
            cancel: CancelToken::new(),
        }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Replace the candidate extensions.
    pub fn extensions(mut self, exts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.options.extensions = exts.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the excluded directory names.
    pub fn exclude_dirs(mut self, dirs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.options.excluded_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Read aliases from this file instead of probing the defaults.
    pub fn alias_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.alias_config = Some(path.into());
        self
    }

    /// Set the number of worker threads.
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.options.jobs = jobs;
        self
    }

    /// Set the minimum number of files a worker takes per split.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.options.batch_size = size;
        self
    }

    /// Add framework-exempt file names.
    pub fn exempt_names(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.options.exempt_names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Share a cancellation flag with the caller.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Run the analysis and return results.
    ///
    /// Recovered per-file and per-directory failures end up in
    /// [`AnalysisResult::diagnostics`]. Only invalid options and
    /// cancellation are returned as errors.
    pub fn analyze(&self) -> DeadfileResult<AnalysisResult> {
        let started = Instant::now();
        let opts = &self.options;
        opts.validate()?;

        let root = std::path::absolute(&opts.root).map_err(|e| DeadfileError::io(&opts.root, e))?;
        let root_key = path_to_normalized_string(&root);
        info!(root = %root_key, jobs = opts.jobs, "analysis started");

        let mut diagnostics = Vec::new();

        // 1. Alias table
        let aliases = load_alias_table(&root, opts.alias_config.as_deref());
        diagnostics.extend(aliases.diagnostic);
        let table = Arc::new(aliases.table);

        // 2. Discovery
        let discovery = discover_files(&root, &opts.extensions, &opts.excluded_dirs);
        diagnostics.extend(discovery.diagnostics);
        let files = discovery.files;
        info!(files = files.len(), aliases = table.len(), "discovery finished");

        if self.cancel.is_cancelled() {
            return Err(DeadfileError::Cancelled);
        }

        // 3. Extraction + resolution
        let extractor = ImportExtractor::new().with_aliases(Arc::clone(&table));
        let resolver = PathResolver::new(&root_key, &opts.extensions, Arc::clone(&table));
        let context = UnitContext::new(extractor, resolver, &files);
        let settings = PoolSettings {
            jobs: opts.jobs,
            batch_size: opts.batch_size,
        };
        let merged = collect_references(&files, &context, settings, &self.cancel)?;
        diagnostics.extend(merged.diagnostics);
        diagnostics.sort();

        // 4. Classification
        let conventions = FrameworkConventions::with_extra(opts.exempt_names.iter().cloned());
        let classification = classify(&files, &merged.referenced, &conventions);

        let to_relative = |keys: &BTreeSet<String>| -> Vec<String> {
            let mut out: Vec<String> = keys
                .iter()
                .map(|k| relative_key(k, &root_key).to_string())
                .collect();
            out.sort();
            out
        };

        let mut edges: Vec<ImportEdge> = merged
            .edges
            .iter()
            .map(|e| ImportEdge {
                from: relative_key(&e.from, &root_key).to_string(),
                to: relative_key(&e.to, &root_key).to_string(),
            })
            .collect();
        edges.sort();

        let result = AnalysisResult {
            root,
            total_files: files.len(),
            referenced: to_relative(&classification.referenced),
            unreferenced: to_relative(&classification.unreferenced),
            exempt: to_relative(&classification.exempt),
            edges,
            diagnostics,
            duration: started.elapsed(),
        };

        info!(
            total = result.total_files,
            referenced = result.referenced.len(),
            unreferenced = result.unreferenced.len(),
            exempt = result.exempt.len(),
            diagnostics = result.diagnostics.len(),
            elapsed_ms = result.duration.as_millis() as u64,
            "analysis finished"
        );
        debug!(edges = result.edges.len(), specifiers = merged.specifiers, "merge stats");

        Ok(result)
    }
}

/// An import edge between two project files, relative to the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ImportEdge {
    pub from: String,
    pub to: String,
}

/// Result of running the analysis.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Absolute root path that was analyzed
    pub root: PathBuf,

    /// Total number of candidate files found
    pub total_files: usize,

    /// Files imported by at least one other file (sorted, relative)
    pub referenced: Vec<String>,

    /// Files nothing imports (sorted, relative)
    pub unreferenced: Vec<String>,

    /// Unimported files kept because of a framework naming convention
    pub exempt: Vec<String>,

    /// Resolved importer → target pairs (sorted, relative)
    pub edges: Vec<ImportEdge>,

    /// Recovered failures, sorted
    pub diagnostics: Vec<Diagnostic>,

    pub duration: Duration,
}

impl AnalysisResult {
    /// Check if any unreferenced file was found.
    pub fn has_unreferenced(&self) -> bool {
        !self.unreferenced.is_empty()
    }

    /// Unreferenced files grouped by containing directory (`.` for the root).
    ///
    /// Values are file names, sorted.
    pub fn unreferenced_by_directory(&self) -> BTreeMap<String, Vec<String>> {
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for file in &self.unreferenced {
            let dir = parent_key(file);
            let name = file.rsplit('/').next().unwrap_or(file);
            groups.entry(dir.to_string()).or_default().push(name.to_string());
        }
        for names in groups.values_mut() {
            names.sort();
        }
        groups
    }

    /// Number of unreferenced files per extension.
    pub fn unreferenced_by_extension(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for file in &self.unreferenced {
            let name = file.rsplit('/').next().unwrap_or(file);
            let ext = match name.rsplit_once('.') {
                Some((stem, ext)) if !stem.is_empty() => ext,
                _ => "",
            };
            *counts.entry(ext.to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Get percentage of unreferenced files.
    pub fn unreferenced_percentage(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.unreferenced.len() as f64 / self.total_files as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn create_test_project() -> PathBuf {
        // Unique dir name to avoid conflicts with concurrent tests
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "deadfile_builder_test_{}_{}",
            std::process::id(),
            id
        ));

        if dir.exists() {
            fs::remove_dir_all(&dir).ok();
        }

        fs::create_dir_all(dir.join("src")).expect("Failed to create test directory");

        fs::write(dir.join("src/main.ts"), "import { helper } from './used';\n")
            .expect("Failed to write main.ts");
        fs::write(dir.join("src/used.ts"), "export const helper = 1;\n")
            .expect("Failed to write used.ts");
        fs::write(dir.join("src/dead.ts"), "export const unused = 1;\n")
            .expect("Failed to write dead.ts");

        dir
    }

    fn sample_result(unreferenced: &[&str], total: usize) -> AnalysisResult {
        AnalysisResult {
            root: PathBuf::from("/test"),
            total_files: total,
            referenced: Vec::new(),
            unreferenced: unreferenced.iter().map(|s| s.to_string()).collect(),
            exempt: Vec::new(),
            edges: Vec::new(),
            diagnostics: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    #[test]
    fn test_builder_basic() {
        let dir = create_test_project();

        let result = Deadfile::new(&dir).extensions(["ts"]).jobs(2).analyze().unwrap();

        assert_eq!(result.total_files, 3);
        assert_eq!(result.referenced, vec!["src/used.ts"]);
        assert_eq!(result.unreferenced, vec!["src/dead.ts", "src/main.ts"]);
        assert_eq!(
            result.edges,
            vec![ImportEdge {
                from: "src/main.ts".into(),
                to: "src/used.ts".into()
            }]
        );
        assert!(result.has_unreferenced());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_builder_exempt_names() {
        let dir = create_test_project();

        let result = Deadfile::new(&dir)
            .extensions([".ts"])
            .exempt_names(["main.ts"])
            .analyze()
            .unwrap();

        assert_eq!(result.unreferenced, vec!["src/dead.ts"]);
        assert_eq!(result.exempt, vec!["src/main.ts"]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_builder_rejects_bad_options() {
        assert!(matches!(
            Deadfile::new("/nonexistent").jobs(0).analyze(),
            Err(DeadfileError::InvalidArgument { .. })
        ));
        assert!(matches!(
            Deadfile::new("/nonexistent").extensions(["", "."]).analyze(),
            Err(DeadfileError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_builder_cancelled() {
        let dir = create_test_project();
        let token = CancelToken::new();
        token.cancel();

        let result = Deadfile::new(&dir).cancel_token(token).analyze();
        assert!(matches!(result, Err(DeadfileError::Cancelled)));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_default_options() {
        let opts = AnalysisOptions::new("/p");
        assert_eq!(opts.extensions, vec!["tsx", "ts"]);
        assert!(opts.excluded_dirs.contains(&"node_modules".to_string()));
        assert_eq!(opts.batch_size, 1);
        assert!(opts.jobs >= 1);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_unreferenced_by_directory() {
        let result = sample_result(&["a.ts", "src/lib/z.ts", "src/lib/b.tsx", "src/c.ts"], 10);
        let groups = result.unreferenced_by_directory();

        assert_eq!(groups["."], vec!["a.ts"]);
        assert_eq!(groups["src"], vec!["c.ts"]);
        assert_eq!(groups["src/lib"], vec!["b.tsx", "z.ts"]);
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn test_analysis_result_stats() {
        let result = sample_result(&["src/a.ts", "src/b.tsx", "src/c.ts"], 12);

        assert!(result.has_unreferenced());
        assert!((result.unreferenced_percentage() - 25.0).abs() < 0.01);

        let by_ext = result.unreferenced_by_extension();
        assert_eq!(by_ext["ts"], 2);
        assert_eq!(by_ext["tsx"], 1);

        let empty = sample_result(&[], 0);
        assert!(!empty.has_unreferenced());
        assert_eq!(empty.unreferenced_percentage(), 0.0);
    }
}
