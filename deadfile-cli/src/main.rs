//! deadfile CLI - unreferenced source file detector for JS/TS projects.
//!
//! Features:
//! - Automatic project root detection (package.json / tsconfig.json)
//! - tsconfig/jsconfig path alias resolution
//! - Rayon-powered parallel import extraction
//! - deadfile.toml settings, overridden by flags
//! - Graphviz DOT visualization of the import graph

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

use deadfile_core::{
    find_project_root, generate_dot, graph_for_result, inbound_counts, init_structured_logging,
    load_config, log_error, log_warn, print_json, print_plain, AnalysisOptions, AnalysisResult, Deadfile,
    DeadfileConfig, WORKER_THREAD_PREFIX,
};

#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Find source files no other file imports")]
pub struct Cli {
    /// Path inside the project; the whole project around it (nearest ancestor with package.json or tsconfig.json) is analyzed
    #[arg(default_value = ".")]
    path: String,

    /// File extensions to analyze (default: tsx ts)
    #[arg(long = "files", value_name = "EXT", num_args = 1..)]
    files: Vec<String>,

    /// Directory names to exclude (default: node_modules .next .git dist build)
    #[arg(long, value_name = "DIR", num_args = 1..)]
    exclude: Vec<String>,

    /// Number of worker threads (default: CPU count)
    #[arg(long, short = 'j')]
    jobs: Option<usize>,

    /// Alias config file, relative to the project root
    #[arg(long, value_name = "FILE")]
    tsconfig: Option<String>,

    /// Extra file names treated as framework entry points
    #[arg(long, value_name = "NAME", num_args = 1..)]
    exempt: Vec<String>,

    /// Output results in JSON format
    #[arg(long)]
    json: bool,

    /// Print import statistics after the report
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Generate Graphviz DOT output for the import graph
    #[arg(long)]
    dot: bool,

    /// Write DOT output to a specified file instead of stdout
    #[arg(long)]
    dot_file: Option<String>,
}

/// Effective run settings after merging flags over deadfile.toml.
#[derive(Debug)]
struct RunSettings {
    options: AnalysisOptions,
    json: bool,
}

/// Flags win over deadfile.toml, which wins over defaults.
fn merge_settings(cli: &Cli, root: &Path, cfg: Option<DeadfileConfig>) -> RunSettings {
    let cfg = cfg.unwrap_or_default();
    let mut options = AnalysisOptions::new(root);

    if !cli.files.is_empty() {
        options.extensions = cli.files.clone();
    } else if let Some(exts) = cfg.extensions.clone() {
        options.extensions = exts;
    }

    if !cli.exclude.is_empty() {
        options.excluded_dirs = cli.exclude.clone();
    } else if let Some(dirs) = cfg.exclude.clone() {
        options.excluded_dirs = dirs;
    }

    if let Some(jobs) = cli.jobs.or(cfg.jobs) {
        options.jobs = jobs;
    }

    options.alias_config = cli
        .tsconfig
        .clone()
        .or_else(|| cfg.tsconfig.clone())
        .map(PathBuf::from);

    options.exempt_names = cfg.exempt.clone().unwrap_or_default();
    options.exempt_names.extend(cli.exempt.iter().cloned());

    RunSettings {
        options,
        json: cli.json || cfg.wants_json(),
    }
}

/// Security: Validates output file paths to prevent path traversal attacks.
///
/// Rejects:
/// - Absolute paths (must be relative to current directory)
/// - Paths containing `..` (parent directory traversal)
/// - Paths with null bytes (injection attacks)
fn validate_output_path(path: &str) -> Result<PathBuf> {
    if path.contains('\0') {
        return Err(anyhow!("Output path contains null bytes"));
    }

    let p = PathBuf::from(path);

    if p.is_absolute() || path.starts_with('/') || path.starts_with('\\') {
        return Err(anyhow!(
            "Output path must be relative, not absolute: {}",
            path
        ));
    }

    let normalized = path.replace('\\', "/");
    if normalized.split('/').any(|seg| seg == "..") {
        return Err(anyhow!(
            "Path traversal (..) not allowed in output paths: {}",
            path
        ));
    }

    Ok(p)
}

/// Most-imported files, for `--verbose`.
fn print_import_stats(result: &AnalysisResult) {
    let g = graph_for_result(result);
    let mut counts: Vec<(&str, usize)> = inbound_counts(&g)
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    println!();
    println!("Import edges: {}", result.edges.len());
    if !counts.is_empty() {
        println!("MOST IMPORTED:");
        for (file, n) in counts.iter().take(10) {
            println!("  {:>4}  {}", n, file);
        }
    }

    let by_ext = result.unreferenced_by_extension();
    if !by_ext.is_empty() {
        println!("UNREFERENCED BY EXTENSION:");
        for (ext, n) in by_ext {
            println!("  .{}: {}", ext, n);
        }
    }
}

/// Worker panics already surface as diagnostics in the report.
fn reports_panic(thread_name: Option<&str>) -> bool {
    !thread_name.is_some_and(|name| name.starts_with(WORKER_THREAD_PREFIX))
}

fn main() -> Result<()> {
    std::panic::set_hook(Box::new(|info| {
        if reports_panic(std::thread::current().name()) {
            eprintln!("[PANIC] deadfile internal error: {}", info);
        }
    }));

    // Structured logging (JSON to stderr, respects RUST_LOG)
    init_structured_logging();

    let cli = Cli::parse();

    // 1. Determine project root (PATH widens to the enclosing project)
    let input_path = Path::new(&cli.path);
    if !input_path.exists() {
        return Err(anyhow!("Path does not exist: {}", cli.path));
    }
    let root = find_project_root(input_path);

    // 2. Load deadfile.toml if present (don't fail on config errors)
    let cfg = match load_config(&root) {
        Ok(cfg) => cfg,
        Err(e) => {
            log_warn(&format!("config load failed: {:#}", e));
            None
        }
    };
    let settings = merge_settings(&cli, &root, cfg);

    // 3. Run the analysis
    let result = Deadfile::from_options(settings.options)
        .analyze()
        .with_context(|| format!("Analysis failed for: {}", root.display()))?;

    // 4. Report results
    if settings.json {
        print_json(&result);
    } else {
        print_plain(&result);
        if cli.verbose {
            print_import_stats(&result);
        }
    }

    // 5. DOT/Graphviz output (don't crash on write errors)
    if cli.dot || cli.dot_file.is_some() {
        let dot = generate_dot(&result);
        if let Some(ref file) = cli.dot_file {
            match validate_output_path(file) {
                Ok(safe_path) => {
                    if let Err(e) = fs::write(&safe_path, &dot) {
                        eprintln!("[WARN] DOT write failed to {}: {}", safe_path.display(), e);
                    }
                }
                Err(e) => {
                    log_error(&format!("invalid output path: {}", e));
                    eprintln!("[ERROR] Invalid output path: {}", e);
                    std::process::exit(2);
                }
            }
        } else {
            println!("{}", dot);
        }
    }

    // 6. Exit code (CI-friendly)
    std::process::exit(if result.has_unreferenced() { 1 } else { 0 });
}
