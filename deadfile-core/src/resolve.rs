//! Specifier → candidate path resolution.
//!
//! Pure string computation: no filesystem access happens here. The
//! candidates are matched against the discovered files by set membership in
//! the orchestrator, so resolution can run on any worker without I/O.

use std::sync::Arc;

use crate::alias::AliasTable;
use crate::paths::{join_normalized, normalize_path_string, parent_key};
use crate::scan::normalize_extension;

/// File stem used for directory imports (`./button` → `./button/index.tsx`).
const INDEX_STEM: &str = "index";

/// Computes candidate paths for import specifiers.
#[derive(Debug, Clone)]
pub struct PathResolver {
    /// Normalized project root
    root: String,
    /// Accepted extensions, without dots, in configured order
    extensions: Vec<String>,
    aliases: Arc<AliasTable>,
}

impl PathResolver {
    pub fn new<S: AsRef<str>>(root: &str, extensions: &[S], aliases: Arc<AliasTable>) -> Self {
        Self {
            root: normalize_path_string(root),
            extensions: extensions
                .iter()
                .map(|e| normalize_extension(e.as_ref()))
                .filter(|e| !e.is_empty())
                .collect(),
            aliases,
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Ordered, de-duplicated candidate keys for `specifier` imported from
    /// the file whose normalized key is `origin`.
    ///
    /// - relative: resolved against the directory containing `origin`
    /// - aliased: every matching alias, every base, in table order
    /// - anything else: empty
    pub fn resolve(&self, specifier: &str, origin: &str) -> Vec<String> {
        let mut out = Vec::new();

        if specifier.starts_with('.') {
            let base = join_normalized(parent_key(origin), specifier);
            self.expand(&base, specifier, &mut out);
            return out;
        }

        for (alias, rest) in self.aliases.matches(specifier) {
            for base_dir in &alias.bases {
                let dir = join_normalized(&self.root, base_dir);
                let base = join_normalized(&dir, rest);
                self.expand(&base, specifier, &mut out);
            }
        }

        out
    }

    /// Push the file-shaped and directory-shaped candidates for `base`.
    ///
    /// File shape: the literal path first if `specifier` already carries an
    /// accepted extension, then `base.<ext>` for every other extension.
    /// Directory shape: `base/index.<ext>` for every extension.
    fn expand(&self, base: &str, specifier: &str, out: &mut Vec<String>) {
        let literal_ext = self
            .extensions
            .iter()
            .find(|ext| has_extension(specifier, ext));

        if literal_ext.is_some() {
            push_unique(out, base.to_string());
        }
        for ext in &self.extensions {
            if Some(ext) == literal_ext {
                continue;
            }
            push_unique(out, format!("{}.{}", base, ext));
        }
        for ext in &self.extensions {
            push_unique(out, format!("{}/{}.{}", base, INDEX_STEM, ext));
        }
    }
}

/// `./b.ts` has extension `ts`; `./b.d` does not have `ts`.
fn has_extension(specifier: &str, ext: &str) -> bool {
    specifier
        .strip_suffix(ext)
        .is_some_and(|stem| stem.ends_with('.') && stem.len() > 1)
}

fn push_unique(out: &mut Vec<String>, candidate: String) {
    if !out.contains(&candidate) {
        out.push(candidate);
    }
}
