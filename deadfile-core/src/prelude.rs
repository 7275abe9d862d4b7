//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use deadfile_core::prelude::*;
//! ```

// Core analysis types
pub use crate::error::{DeadfileError, DeadfileResult, Diagnostic};

// Builder API
pub use crate::builder::{AnalysisOptions, AnalysisResult, Deadfile};

// Cancellation
pub use crate::orchestrator::CancelToken;

// Configuration
pub use crate::config::{load_config, DeadfileConfig};

// Project root detection
pub use crate::project::find_project_root;

// Reporting
pub use crate::report::{print_json, print_plain};
