//! Lexical import extraction.
//!
//! No grammar is involved: each import form is a regex over quoted string
//! literals that follow a recognized keyword. Forms are matched
//! independently, so a file mixing static imports, `require()` calls and
//! re-exports yields the union of all of them.
//!
//! Specifiers assembled at runtime (concatenation, `${}` interpolation) are
//! not seen. This is an accepted source of false negatives.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::alias::AliasTable;
use crate::error::{DeadfileResult, IoResultExt};

/// Characters that introduce an aliased specifier when no alias table says
/// otherwise.
pub const DEFAULT_SIGILS: &[char] = &['@', '~', '#', '$'];

/// Import syntax forms recognized by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportForm {
    /// `import x from '...'`, `import { a } from "..."`, `import type T from '...'`
    StaticFrom,
    /// `import '...'`
    SideEffect,
    /// `import('...')`
    Dynamic,
    /// `require('...')`
    Require,
    /// `export * from '...'`, `export { a } from '...'`
    ReExport,
}

/// Compiled pattern for one import form.
struct FormPattern {
    form: ImportForm,
    regex: Regex,
}

/// Quoted literal: `'x'` or `"x"`, captured in group `sq` or `dq`.
const QUOTED: &str = r#"(?:'(?P<sq>[^'\n]+)'|"(?P<dq>[^"\n]+)")"#;
/// Quoted or backtick literal, for call-style forms.
const QUOTED_OR_TEMPLATE: &str =
    r#"(?:'(?P<sq>[^'\n]+)'|"(?P<dq>[^"\n]+)"|`(?P<bt>[^`\n]+)`)"#;

fn patterns() -> &'static [FormPattern] {
    static PATTERNS: OnceLock<Vec<FormPattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let sources = [
            (
                ImportForm::StaticFrom,
                // `from` closes an import clause: `import ... from`
                format!(r#"\bimport\s+[^'";`]*?\bfrom\s*{}"#, QUOTED),
            ),
            (ImportForm::SideEffect, format!(r#"\bimport\s*{}"#, QUOTED)),
            (
                ImportForm::Dynamic,
                format!(r#"\bimport\s*\(\s*{}\s*\)"#, QUOTED_OR_TEMPLATE),
            ),
            (
                ImportForm::Require,
                format!(r#"\brequire\s*\(\s*{}\s*\)"#, QUOTED_OR_TEMPLATE),
            ),
            (
                ImportForm::ReExport,
                format!(
                    r#"\bexport\s+(?:type\s+)?(?:\*(?:\s+as\s+[\w$]+)?|\{{[^}}]*\}})\s*from\s*{}"#,
                    QUOTED
                ),
            ),
        ];
        sources
            .into_iter()
            // SAFETY: the patterns are constant and covered by the tests below.
            .map(|(form, src)| FormPattern {
                form,
                regex: Regex::new(&src).expect("Hardcoded import pattern is valid"),
            })
            .collect()
    })
}

/// Pull the literal out of whichever quote group matched.
fn literal<'t>(caps: &regex::Captures<'t>) -> Option<&'t str> {
    caps.name("sq")
        .or_else(|| caps.name("dq"))
        .or_else(|| caps.name("bt"))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty() && !s.contains("${"))
}

/// Classification of a raw specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecifierKind {
    /// Starts with `.`
    Relative,
    /// Starts with an alias sigil or is addressed by the alias table
    Aliased,
    /// Package name or anything else that cannot be a project file
    Bare,
}

/// Extracts raw import specifiers from source text.
#[derive(Debug, Clone)]
pub struct ImportExtractor {
    sigils: Vec<char>,
    aliases: Option<Arc<AliasTable>>,
}

impl Default for ImportExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportExtractor {
    /// Extractor with the default alias sigils.
    pub fn new() -> Self {
        Self {
            sigils: DEFAULT_SIGILS.to_vec(),
            aliases: None,
        }
    }

    /// Add sigils (typically from the loaded alias table).
    pub fn with_sigils(mut self, extra: impl IntoIterator<Item = char>) -> Self {
        for c in extra {
            if !self.sigils.contains(&c) {
                self.sigils.push(c);
            }
        }
        self
    }

    /// Keep any specifier the table addresses, including keys without a
    /// sigil such as the catch-all `*`.
    pub fn with_aliases(self, table: Arc<AliasTable>) -> Self {
        let mut out = self.with_sigils(table.sigils());
        out.aliases = Some(table);
        out
    }

    /// Classify a specifier.
    pub fn classify(&self, specifier: &str) -> SpecifierKind {
        match specifier.chars().next() {
            Some('.') => SpecifierKind::Relative,
            Some(c) if self.sigils.contains(&c) => SpecifierKind::Aliased,
            Some(_) if self.is_aliased(specifier) => SpecifierKind::Aliased,
            _ => SpecifierKind::Bare,
        }
    }

    fn is_aliased(&self, specifier: &str) -> bool {
        self.aliases
            .as_ref()
            .is_some_and(|table| table.matches(specifier).next().is_some())
    }

    /// Every import-like specifier in `content`, bare ones included.
    pub fn extract_all(&self, content: &str) -> Vec<(ImportForm, String)> {
        let mut out = Vec::new();
        for pattern in patterns() {
            for caps in pattern.regex.captures_iter(content) {
                if let Some(spec) = literal(&caps) {
                    out.push((pattern.form, spec.to_string()));
                }
            }
        }
        out
    }

    /// Relative and aliased specifiers referenced by `content`.
    ///
    /// Bare package specifiers are discarded.
    pub fn extract(&self, content: &str) -> BTreeSet<String> {
        self.extract_all(content)
            .into_iter()
            .map(|(_, spec)| spec)
            .filter(|spec| self.classify(spec) != SpecifierKind::Bare)
            .collect()
    }

    /// Read `path` and extract its specifiers.
    ///
    /// Non-UTF-8 content is reported as an I/O error.
    pub fn extract_file(&self, path: &Path) -> DeadfileResult<BTreeSet<String>> {
        let content = fs::read_to_string(path).with_path(path)?;
        Ok(self.extract(&content))
    }
}

/// Extract with the default sigils.
pub fn extract_imports(content: &str) -> BTreeSet<String> {
    ImportExtractor::new().extract(content)
}
