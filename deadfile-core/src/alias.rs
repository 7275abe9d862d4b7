//! Path alias table loaded from a tsconfig-style `compilerOptions.paths` map.
//!
//! Loading is lenient at every step: a missing file, unparsable JSON or a
//! config without `paths` all produce an empty table plus an optional
//! diagnostic. Resolution then falls back to relative specifiers only.
//!
//! Config files are JSONC in practice: plain JSON is tried first, then the
//! JSON5 parser from `json-five`, which accepts comments and trailing commas.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{DeadfileError, DeadfileResult, Diagnostic, IoResultExt};

/// Config files probed in the project root when no explicit path is given.
pub const DEFAULT_ALIAS_SOURCES: &[&str] = &["tsconfig.json", "jsconfig.json"];

/// Maximum number of `extends` hops followed.
const MAX_EXTENDS_DEPTH: u32 = 3;

/// How an alias key matches a specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasMatch {
    /// `@ui/*`: matches `@ui` or anything under `@ui/`
    Directory,
    /// `~*`: matches anything starting with `~`
    Prefix,
    /// `@config`: matches only `@config`
    Exact,
}

/// One alias entry, in config order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    /// Key with the wildcard marker stripped (`@ui/*` → `@ui`)
    pub prefix: String,
    pub matching: AliasMatch,
    /// Base directories relative to the project root, wildcard stripped
    pub bases: Vec<String>,
}

impl Alias {
    /// Parse a raw `paths` entry.
    pub fn new(key: &str, targets: &[String]) -> Self {
        let (prefix, matching) = split_wildcard(key);
        let bases = targets.iter().map(|t| split_wildcard(t).0).collect();
        Self {
            prefix,
            matching,
            bases,
        }
    }

    /// If `specifier` is addressed by this alias, return the remainder that
    /// follows the prefix (without a leading `/`).
    pub fn strip<'a>(&self, specifier: &'a str) -> Option<&'a str> {
        let rest = specifier.strip_prefix(self.prefix.as_str())?;
        match self.matching {
            AliasMatch::Exact => rest.is_empty().then_some(rest),
            AliasMatch::Prefix => Some(rest.trim_start_matches('/')),
            AliasMatch::Directory => {
                if rest.is_empty() {
                    Some(rest)
                } else {
                    rest.strip_prefix('/')
                }
            }
        }
    }
}

/// `@ui/*` → (`@ui`, Directory), `~*` → (`~`, Prefix), `x` → (`x`, Exact)
fn split_wildcard(raw: &str) -> (String, AliasMatch) {
    if let Some(dir) = raw.strip_suffix("/*") {
        (dir.to_string(), AliasMatch::Directory)
    } else if let Some(prefix) = raw.strip_suffix('*') {
        (prefix.to_string(), AliasMatch::Prefix)
    } else {
        (raw.trim_end_matches('/').to_string(), AliasMatch::Exact)
    }
}

/// Ordered alias mapping. Read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    aliases: Vec<Alias>,
}

impl AliasTable {
    pub fn new(aliases: Vec<Alias>) -> Self {
        Self { aliases }
    }

    /// Build from `(key, targets)` pairs in order.
    pub fn from_pairs<K, T>(pairs: impl IntoIterator<Item = (K, Vec<T>)>) -> Self
    where
        K: AsRef<str>,
        T: Into<String>,
    {
        let aliases = pairs
            .into_iter()
            .map(|(k, targets)| {
                let targets: Vec<String> = targets.into_iter().map(Into::into).collect();
                Alias::new(k.as_ref(), &targets)
            })
            .collect();
        Self { aliases }
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Alias> {
        self.aliases.iter()
    }

    /// Every alias that addresses `specifier`, in table order, with the
    /// remainder after its prefix.
    pub fn matches<'s>(&'s self, specifier: &'s str) -> impl Iterator<Item = (&'s Alias, &'s str)> {
        self.aliases
            .iter()
            .filter_map(move |alias| alias.strip(specifier).map(|rest| (alias, rest)))
    }

    /// Leading characters of the alias prefixes (`@`, `~`, ...).
    pub fn sigils(&self) -> Vec<char> {
        let mut out: Vec<char> = self
            .aliases
            .iter()
            .filter_map(|a| a.prefix.chars().next())
            .filter(|c| *c != '.')
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}

/// Outcome of loading the alias table.
#[derive(Debug, Clone, Default)]
pub struct AliasLoad {
    pub table: AliasTable,
    /// File the table was read from, if any
    pub source: Option<PathBuf>,
    pub diagnostic: Option<Diagnostic>,
}

/// Load the alias table for a project.
///
/// With `explicit` set, only that file is read (relative paths are taken
/// from `root`). Otherwise [`DEFAULT_ALIAS_SOURCES`] are probed in order and
/// the first existing file is used. Never fails.
pub fn load_alias_table(root: &Path, explicit: Option<&Path>) -> AliasLoad {
    let path = match explicit {
        Some(p) if p.is_absolute() => p.to_path_buf(),
        Some(p) => root.join(p),
        None => match DEFAULT_ALIAS_SOURCES
            .iter()
            .map(|name| root.join(name))
            .find(|p| p.is_file())
        {
            Some(found) => found,
            None => {
                debug!(root = %root.display(), "no alias config found");
                return AliasLoad::default();
            }
        },
    };

    match read_alias_file(&path, 0) {
        Ok(table) => {
            info!(path = %path.display(), aliases = table.len(), "alias table loaded");
            AliasLoad {
                table,
                source: Some(path),
                diagnostic: None,
            }
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "alias config unusable, continuing without aliases");
            let diagnostic = Diagnostic::from(&as_alias_error(&path, e));
            AliasLoad {
                table: AliasTable::default(),
                source: Some(path),
                diagnostic: Some(diagnostic),
            }
        }
    }
}

fn as_alias_error(path: &Path, err: DeadfileError) -> DeadfileError {
    match err {
        DeadfileError::AliasConfig { .. } => err,
        other => DeadfileError::alias_config(path, other.to_string()),
    }
}

/// Read one config file, following `extends` when it defines no `paths`.
fn read_alias_file(path: &Path, depth: u32) -> DeadfileResult<AliasTable> {
    let raw = fs::read_to_string(path).with_path(path)?;
    let doc = parse_config_value(&raw)
        .map_err(|message| DeadfileError::alias_config(path, format!("invalid JSON: {}", message)))?;

    if let Some(paths) = doc
        .get("compilerOptions")
        .and_then(|c| c.get("paths"))
        .and_then(Value::as_object)
    {
        let pairs = paths.iter().map(|(key, value)| {
            let targets: Vec<String> = match value {
                Value::Array(items) => items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
                Value::String(s) => vec![s.clone()],
                _ => Vec::new(),
            };
            (key.as_str(), targets)
        });
        return Ok(AliasTable::from_pairs(pairs));
    }

    if let Some(parent) = doc.get("extends").and_then(Value::as_str) {
        if depth >= MAX_EXTENDS_DEPTH {
            return Err(DeadfileError::alias_config(path, "extends chain too deep"));
        }
        if let Some(next) = extends_target(path, parent) {
            debug!(from = %path.display(), to = %next.display(), "following extends");
            return read_alias_file(&next, depth + 1);
        }
    }

    Ok(AliasTable::default())
}

/// Local `extends` target, `.json` appended when the bare path is missing.
/// Package references (`@tsconfig/next`) are not followed.
fn extends_target(from: &Path, target: &str) -> Option<PathBuf> {
    if !target.starts_with('.') && !Path::new(target).is_absolute() {
        return None;
    }
    let base = from.parent().unwrap_or_else(|| Path::new("."));
    let candidate = base.join(target);
    if candidate.is_file() {
        return Some(candidate);
    }
    let with_json = PathBuf::from(format!("{}.json", candidate.display()));
    with_json.is_file().then_some(with_json)
}

/// Parse tsconfig-style text: strict JSON first, then JSON5 for comments
/// and trailing commas. Key order is kept either way.
pub fn parse_config_value(content: &str) -> Result<Value, String> {
    match serde_json::from_str(content) {
        Ok(v) => Ok(v),
        Err(strict) => json_five::from_str::<Value>(content).map_err(|relaxed| {
            debug!(error = %strict, "strict JSON parse failed, retried as JSON5");
            relaxed.to_string()
        }),
    }
}
