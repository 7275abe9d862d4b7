//! deadfile-core: unreferenced source file detection for module-based
//! JS/TS projects.
//!
//! Walks a project tree, extracts every import-like statement from each
//! candidate file, resolves the specifiers against relative paths, path
//! aliases and index-file conventions, and reports the files that no other
//! file imports. Everything is lexical: no compiler or bundler is run.
//!
//! # Quick Start
//!
//! Use the [`prelude`] module for convenient imports:
//!
//! ```rust,ignore
//! use deadfile_core::prelude::*;
//!
//! let result = Deadfile::new("/path/to/project")
//!     .extensions(["tsx", "ts"])
//!     .analyze()?;
//!
//! for file in &result.unreferenced {
//!     println!("Unreferenced: {}", file);
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`scan`]: candidate file discovery with excluded-directory pruning
//! - [`alias`]: path alias table from tsconfig.json / jsconfig.json
//! - [`extract`]: lexical import specifier extraction
//! - [`resolve`]: specifier → candidate path computation
//! - [`orchestrator`]: parallel extract/resolve with set-union merge
//! - [`detect`]: referenced / unreferenced classification
//! - [`builder`]: fluent builder API and analysis result
//! - [`graph`]: petgraph import graph
//! - [`report`]: plain text and JSON output
//! - [`error`]: typed errors and diagnostics
//!
//! # Cargo Features
//!
//! - `dot` (default): Graphviz DOT export of the import graph

// Core modules (always available)
pub mod alias;
pub mod builder;
pub mod config;
pub mod detect;
pub mod error;
pub mod extract;
pub mod graph;
pub mod logging;
pub mod orchestrator;
pub mod paths;
pub mod prelude;
pub mod project;
pub mod report;
pub mod resolve;
pub mod scan;

// Feature-gated modules
#[cfg(feature = "dot")]
pub mod visualize;

// ============================================================================
// Explicit Re-exports (avoiding glob imports for clear API surface)
// ============================================================================

// Error types
pub use error::{DeadfileError, DeadfileResult, Diagnostic, DiagnosticKind, IoResultExt};

// Builder API
pub use builder::{AnalysisOptions, AnalysisResult, Deadfile, ImportEdge};

// Configuration
pub use config::{load_config, parse_config, DeadfileConfig, OutputConfig, CONFIG_FILE_NAME};

// Alias table
pub use alias::{load_alias_table, parse_config_value, Alias, AliasLoad, AliasMatch, AliasTable};

// Extraction
pub use extract::{extract_imports, ImportExtractor, ImportForm, SpecifierKind};

// Resolution
pub use resolve::PathResolver;

// Orchestration
pub use orchestrator::{
    collect_references, default_jobs, run_units, CancelToken, MergedReferences, PoolSettings,
    UnitContext, UnitOutcome, WORKER_THREAD_PREFIX,
};

// Classification
pub use detect::{classify, Classification, FrameworkConventions, FRAMEWORK_EXEMPT_FILES};

// Graph building
pub use graph::{build_import_graph, graph_for_result, inbound_counts};

// Logging
pub use logging::{init_structured_logging, log_error, log_warn};

// Path normalization
pub use paths::{normalize_path_string, path_to_normalized_string};

// Project root detection
pub use project::{find_project_root, is_project_root};

// Reporting
pub use report::{print_json, print_plain, render_plain, to_json_value};

// File discovery
pub use scan::{discover_files, CandidateFile, Discovery, DEFAULT_EXCLUDED_DIRS, DEFAULT_EXTENSIONS};

// Feature-gated re-exports
#[cfg(feature = "dot")]
pub use visualize::generate_dot;
