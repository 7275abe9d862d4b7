//! Parallel extract → resolve fan-out with a set-union fan-in.
//!
//! One unit of work per candidate file. A unit owns nothing shared and
//! mutable: it reads the file, extracts specifiers, resolves them, keeps
//! the candidates present in the (read-only) known-file set and returns an
//! owned [`UnitOutcome`]. Rayon's `fold`/`reduce` combine outcomes with a
//! set union, which is commutative and associative, so neither the worker
//! count nor the split size can change the merged result.
//!
//! A unit that panics is caught and turned into an empty outcome carrying a
//! diagnostic. Unreadable files are handled the same way without a panic.

use std::collections::{BTreeSet, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{DeadfileError, DeadfileResult, Diagnostic};
use crate::extract::ImportExtractor;
use crate::resolve::PathResolver;
use crate::scan::CandidateFile;

/// Name prefix of the analysis pool threads. Panics on these threads are
/// caught and turned into diagnostics.
pub const WORKER_THREAD_PREFIX: &str = "deadfile-worker-";

/// Shared cancellation flag.
///
/// Cloning shares the flag. Once cancelled, units still queued are skipped
/// and the run returns [`DeadfileError::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// An import edge between two candidate files (normalized keys).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

/// Result of one unit of work.
#[derive(Debug, Clone, Default)]
pub struct UnitOutcome {
    /// Key of the processed file
    pub file: String,
    /// Specifiers extracted from the file
    pub specifiers: usize,
    /// Known files that at least one specifier resolved to
    pub targets: BTreeSet<String>,
    pub diagnostic: Option<Diagnostic>,
}

/// Merged result of all units.
#[derive(Debug, Clone, Default)]
pub struct MergedReferences {
    /// Keys resolved as a target of at least one specifier
    pub referenced: HashSet<String>,
    pub edges: BTreeSet<Edge>,
    pub diagnostics: Vec<Diagnostic>,
    pub units: usize,
    pub specifiers: usize,
}

impl MergedReferences {
    fn absorb(mut self, outcome: UnitOutcome) -> Self {
        self.units += 1;
        self.specifiers += outcome.specifiers;
        for target in outcome.targets {
            self.edges.insert(Edge {
                from: outcome.file.clone(),
                to: target.clone(),
            });
            self.referenced.insert(target);
        }
        if let Some(diag) = outcome.diagnostic {
            self.diagnostics.push(diag);
        }
        self
    }

    fn union(mut self, other: Self) -> Self {
        self.referenced.extend(other.referenced);
        self.edges.extend(other.edges);
        self.diagnostics.extend(other.diagnostics);
        self.units += other.units;
        self.specifiers += other.specifiers;
        self
    }
}

/// Read-only inputs shared by every unit.
pub struct UnitContext {
    pub extractor: ImportExtractor,
    pub resolver: PathResolver,
    /// Keys of every candidate file
    pub known: HashSet<String>,
}

impl UnitContext {
    pub fn new(extractor: ImportExtractor, resolver: PathResolver, files: &[CandidateFile]) -> Self {
        Self {
            extractor,
            resolver,
            known: files.iter().map(|f| f.key.clone()).collect(),
        }
    }

    /// Extract and resolve one file.
    pub fn process(&self, file: &CandidateFile) -> UnitOutcome {
        let specifiers = match self.extractor.extract_file(&file.path) {
            Ok(specs) => specs,
            Err(e) => {
                warn!(path = %file.path.display(), error = %e, "skipping unreadable file");
                return UnitOutcome {
                    file: file.key.clone(),
                    diagnostic: Some(Diagnostic::unreadable(&file.path, e.to_string())),
                    ..UnitOutcome::default()
                };
            }
        };

        let targets = specifiers
            .iter()
            .flat_map(|spec| self.resolver.resolve(spec, &file.key))
            .filter(|candidate| self.known.contains(candidate))
            .collect();

        UnitOutcome {
            file: file.key.clone(),
            specifiers: specifiers.len(),
            targets,
            diagnostic: None,
        }
    }
}

/// Worker pool settings.
#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    /// Number of worker threads
    pub jobs: usize,
    /// Minimum number of units a worker takes per split
    pub batch_size: usize,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            batch_size: 1,
        }
    }
}

/// Available CPU count, 1 if unknown.
pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Run `unit` over every file on a dedicated pool and merge the outcomes.
pub fn run_units<F>(
    files: &[CandidateFile],
    settings: PoolSettings,
    cancel: &CancelToken,
    unit: F,
) -> DeadfileResult<MergedReferences>
where
    F: Fn(&CandidateFile) -> UnitOutcome + Sync,
{
    if settings.jobs == 0 {
        return Err(DeadfileError::invalid_argument("jobs must be at least 1"));
    }
    let batch = settings.batch_size.max(1);

    let guarded = |file: &CandidateFile| -> Option<UnitOutcome> {
        if cancel.is_cancelled() {
            return None;
        }
        match panic::catch_unwind(AssertUnwindSafe(|| unit(file))) {
            Ok(outcome) => Some(outcome),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(path = %file.path.display(), error = %message, "unit of work failed");
                Some(UnitOutcome {
                    file: file.key.clone(),
                    diagnostic: Some(Diagnostic::from(&DeadfileError::worker(&file.path, message))),
                    ..UnitOutcome::default()
                })
            }
        }
    };

    let merge = || {
        files
            .par_iter()
            .with_min_len(batch)
            .filter_map(guarded)
            .fold(MergedReferences::default, MergedReferences::absorb)
            .reduce(MergedReferences::default, MergedReferences::union)
    };

    let merged = match rayon::ThreadPoolBuilder::new()
        .num_threads(settings.jobs)
        .thread_name(|i| format!("{}{}", WORKER_THREAD_PREFIX, i))
        .build()
    {
        Ok(pool) => pool.install(merge),
        Err(e) => {
            warn!(error = %e, "could not build worker pool, using the global pool");
            merge()
        }
    };

    if cancel.is_cancelled() {
        return Err(DeadfileError::Cancelled);
    }

    debug!(
        units = merged.units,
        specifiers = merged.specifiers,
        referenced = merged.referenced.len(),
        "merge finished"
    );
    Ok(merged)
}

/// Extract and resolve every file with `context`.
pub fn collect_references(
    files: &[CandidateFile],
    context: &UnitContext,
    settings: PoolSettings,
    cancel: &CancelToken,
) -> DeadfileResult<MergedReferences> {
    run_units(files, settings, cancel, |file| context.process(file))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::AliasTable;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::AtomicU64;

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn create_temp_dir(name: &str) -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir()
            .join("deadfile_orchestrator_test")
            .join(format!("{}_{}_{}", name, std::process::id(), id));
        if dir.exists() {
            fs::remove_dir_all(&dir).ok();
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write(root: &Path, rel: &str, content: &str) -> CandidateFile {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        CandidateFile::new(path)
    }

    fn context(root: &Path, files: &[CandidateFile]) -> UnitContext {
        let root_key = crate::paths::path_to_normalized_string(root);
        let resolver = PathResolver::new(&root_key, &["ts"], Arc::new(AliasTable::default()));
        UnitContext::new(ImportExtractor::new(), resolver, files)
    }

    fn fixture(name: &str) -> (PathBuf, Vec<CandidateFile>) {
        let dir = create_temp_dir(name);
        let mut files = Vec::new();
        for i in 0..40 {
            let next = (i * 7 + 3) % 40;
            files.push(write(
                &dir,
                &format!("src/m{}.ts", i),
                &format!("import x from './m{}';\nexport * from '../src/m{}';", next, (i + 1) % 40),
            ));
        }
        files.push(write(&dir, "src/orphan.ts", "import y from 'react';"));
        (dir, files)
    }

    #[test]
    fn test_union_independent_of_jobs_and_batches() {
        let (dir, files) = fixture("union");
        let ctx = context(&dir, &files);

        let baseline = collect_references(
            &files,
            &ctx,
            PoolSettings { jobs: 1, batch_size: 1 },
            &CancelToken::new(),
        )
        .unwrap();

        for (jobs, batch_size) in [(2, 1), (4, 3), (8, 64), (3, 7)] {
            let merged = collect_references(
                &files,
                &ctx,
                PoolSettings { jobs, batch_size },
                &CancelToken::new(),
            )
            .unwrap();
            assert_eq!(merged.referenced, baseline.referenced);
            assert_eq!(merged.edges, baseline.edges);
            assert_eq!(merged.units, files.len());
        }
        assert_eq!(baseline.referenced.len(), 40);
        assert!(!baseline.referenced.iter().any(|k| k.ends_with("orphan.ts")));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unit_records_edges_to_known_files_only() {
        let dir = create_temp_dir("edges");
        let files = vec![
            write(&dir, "a.ts", "import b from './b';\nimport c from './missing';"),
            write(&dir, "b.ts", ""),
        ];
        let ctx = context(&dir, &files);

        let outcome = ctx.process(&files[0]);
        assert_eq!(outcome.specifiers, 2);
        assert_eq!(outcome.targets.len(), 1);
        assert!(outcome.targets.contains(&files[1].key));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unreadable_file_contributes_nothing() {
        let dir = create_temp_dir("unreadable");
        let good = write(&dir, "a.ts", "import b from './b';");
        let target = write(&dir, "b.ts", "");
        let bad_path = dir.join("bad.ts");
        fs::write(&bad_path, [0xffu8, 0xfe, 0x00, 0x69]).unwrap();
        let bad = CandidateFile::new(bad_path);
        let files = vec![good, target.clone(), bad];
        let ctx = context(&dir, &files);

        let merged = collect_references(&files, &ctx, PoolSettings::default(), &CancelToken::new())
            .unwrap();
        assert!(merged.referenced.contains(&target.key));
        assert_eq!(merged.diagnostics.len(), 1);
        assert_eq!(
            merged.diagnostics[0].kind,
            crate::error::DiagnosticKind::UnreadableFile
        );

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_panicking_unit_is_isolated() {
        let (dir, files) = fixture("panic");
        let ctx = context(&dir, &files);
        let poisoned = files[5].key.clone();

        let merged = run_units(
            &files,
            PoolSettings { jobs: 4, batch_size: 1 },
            &CancelToken::new(),
            |file| {
                if file.key == poisoned {
                    panic!("boom");
                }
                ctx.process(file)
            },
        )
        .unwrap();

        assert_eq!(merged.units, files.len());
        assert_eq!(merged.diagnostics.len(), 1);
        assert_eq!(
            merged.diagnostics[0].kind,
            crate::error::DiagnosticKind::WorkerFailure
        );
        assert!(merged.diagnostics[0].message.contains("boom"));
        assert!(!merged.edges.iter().any(|e| e.from == poisoned));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_cancelled_run_returns_no_result() {
        let (dir, files) = fixture("cancel");
        let ctx = context(&dir, &files);
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = collect_references(&files, &ctx, PoolSettings::default(), &cancel);
        assert!(matches!(result, Err(DeadfileError::Cancelled)));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_zero_jobs_rejected() {
        let result = run_units(
            &[],
            PoolSettings { jobs: 0, batch_size: 1 },
            &CancelToken::new(),
            |_| UnitOutcome::default(),
        );
        assert!(matches!(result, Err(DeadfileError::InvalidArgument { .. })));
    }

    #[test]
    fn test_empty_input() {
        let merged = run_units(
            &[],
            PoolSettings::default(),
            &CancelToken::new(),
            |_| UnitOutcome::default(),
        )
        .unwrap();
        assert_eq!(merged.units, 0);
        assert!(merged.referenced.is_empty());
    }
}
