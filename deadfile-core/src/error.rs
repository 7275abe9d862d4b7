//! Typed error handling for deadfile.
//!
//! Two layers live here:
//! - [`DeadfileError`]: errors returned from fallible entry points.
//! - [`Diagnostic`]: recovered, per-file or per-directory problems that are
//!   collected alongside the analysis result instead of aborting the run.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Main error type for deadfile operations.
#[derive(Error, Debug)]
pub enum DeadfileError {
    /// I/O error when reading files or listing directories
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Path alias configuration errors (tsconfig.json / jsconfig.json)
    #[error("Alias config error at {path}: {message}")]
    AliasConfig { path: PathBuf, message: String },

    /// A single unit of work failed
    #[error("Worker failed on {path}: {message}")]
    Worker { path: PathBuf, message: String },

    /// Invalid argument provided
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The run was aborted before classification
    #[error("Analysis cancelled")]
    Cancelled,
}

impl DeadfileError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an alias configuration error.
    pub fn alias_config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::AliasConfig {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a worker error.
    pub fn worker(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Worker {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Get the path associated with this error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::AliasConfig { path, .. } => Some(path),
            Self::Worker { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Convenience type alias for deadfile results.
pub type DeadfileResult<T> = Result<T, DeadfileError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> DeadfileResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> DeadfileResult<T> {
        self.map_err(|e| DeadfileError::io(path, e))
    }
}

/// Category of a recovered problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// File could not be read or decoded; it contributed no specifiers
    UnreadableFile,
    /// Directory could not be listed; its subtree was skipped
    UnlistableDirectory,
    /// Alias configuration missing pieces or unparsable; an empty table was used
    AliasConfig,
    /// A unit of work panicked; it contributed an empty result
    WorkerFailure,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnreadableFile => write!(f, "unreadable file"),
            Self::UnlistableDirectory => write!(f, "unlistable directory"),
            Self::AliasConfig => write!(f, "alias config"),
            Self::WorkerFailure => write!(f, "worker failure"),
        }
    }
}

/// A non-fatal problem surfaced next to the analysis result.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub path: Option<PathBuf>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, path: Option<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path,
            message: message.into(),
        }
    }

    pub fn unreadable(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::UnreadableFile, Some(path.into()), message)
    }

    pub fn unlistable(path: Option<PathBuf>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::UnlistableDirectory, path, message)
    }
}

impl From<&DeadfileError> for Diagnostic {
    fn from(err: &DeadfileError) -> Self {
        let kind = match err {
            DeadfileError::AliasConfig { .. } => DiagnosticKind::AliasConfig,
            DeadfileError::Worker { .. } => DiagnosticKind::WorkerFailure,
            _ => DiagnosticKind::UnreadableFile,
        };
        Self::new(kind, err.path().cloned(), err.to_string())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "[{}] {}: {}", self.kind, path.display(), self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error() {
        let err = DeadfileError::io(
            PathBuf::from("/proj/src/a.ts"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        );
        assert!(matches!(err, DeadfileError::Io { .. }));
        assert_eq!(err.path(), Some(&PathBuf::from("/proj/src/a.ts")));
        assert!(err.to_string().contains("/proj/src/a.ts"));
    }

    #[test]
    fn test_io_result_ext() {
        let result: std::io::Result<()> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        let err = result.with_path("/missing/file.ts").unwrap_err();
        assert_eq!(err.path(), Some(&PathBuf::from("/missing/file.ts")));
    }

    #[test]
    fn test_diagnostic_from_error() {
        let err = DeadfileError::alias_config("/p/tsconfig.json", "trailing garbage");
        let diag = Diagnostic::from(&err);
        assert_eq!(diag.kind, DiagnosticKind::AliasConfig);
        assert_eq!(diag.path, Some(PathBuf::from("/p/tsconfig.json")));
    }

    #[test]
    fn test_worker_error_becomes_worker_failure() {
        let err = DeadfileError::worker("/p/a.ts", "boom");
        let diag = Diagnostic::from(&err);
        assert_eq!(diag.kind, DiagnosticKind::WorkerFailure);
        assert_eq!(diag.path, Some(PathBuf::from("/p/a.ts")));
        assert_eq!(diag.message, "Worker failed on /p/a.ts: boom");
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::unreadable("/p/a.ts", "invalid UTF-8");
        assert_eq!(diag.to_string(), "[unreadable file] /p/a.ts: invalid UTF-8");

        let diag = Diagnostic::unlistable(None, "permission denied");
        assert_eq!(diag.to_string(), "[unlistable directory] permission denied");
    }
}
