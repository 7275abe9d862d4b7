//! Referenced / unreferenced classification.
//!
//! Framework entry points (routing pages, layouts, middleware, ...) are run
//! by the host framework, not imported. They are set aside here, after
//! resolution, so they still count as import targets for other files.

use std::collections::{BTreeSet, HashSet};

use crate::scan::CandidateFile;

/// File names invoked by a routing framework's runtime.
pub const FRAMEWORK_EXEMPT_FILES: &[&str] = &[
    "page.tsx",
    "page.ts",
    "layout.tsx",
    "layout.ts",
    "loading.tsx",
    "loading.ts",
    "error.tsx",
    "error.ts",
    "route.tsx",
    "route.ts",
    "middleware.ts",
    "not-found.tsx",
];

/// Set of exempt file names.
#[derive(Debug, Clone)]
pub struct FrameworkConventions {
    names: HashSet<String>,
}

impl Default for FrameworkConventions {
    fn default() -> Self {
        Self {
            names: FRAMEWORK_EXEMPT_FILES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl FrameworkConventions {
    /// No exemptions at all.
    pub fn none() -> Self {
        Self {
            names: HashSet::new(),
        }
    }

    /// Defaults plus `extra` names.
    pub fn with_extra(extra: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut conventions = Self::default();
        conventions.names.extend(extra.into_iter().map(Into::into));
        conventions
    }

    pub fn is_exempt(&self, file_name: &str) -> bool {
        self.names.contains(file_name)
    }
}

/// Partition of the candidate files, as normalized keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub referenced: BTreeSet<String>,
    pub unreferenced: BTreeSet<String>,
    /// Unreferenced but framework-exempt
    pub exempt: BTreeSet<String>,
}

/// Split `files` by membership in `referenced`.
///
/// Keys in `referenced` that are not candidates are ignored.
pub fn classify(
    files: &[CandidateFile],
    referenced: &HashSet<String>,
    conventions: &FrameworkConventions,
) -> Classification {
    let mut out = Classification::default();
    for file in files {
        if referenced.contains(&file.key) {
            out.referenced.insert(file.key.clone());
        } else if conventions.is_exempt(file.file_name()) {
            out.exempt.insert(file.key.clone());
        } else {
            out.unreferenced.insert(file.key.clone());
        }
    }
    out
}
