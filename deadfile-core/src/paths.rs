//! Path normalization shared by discovery, resolution and classification.
//!
//! Every path that takes part in a set operation goes through
//! [`normalize_path_string`]. Keys are plain strings with `/` separators,
//! no `.` segments, no `..` segments that can be folded, and no duplicate or
//! trailing separators. Case is preserved.

use std::path::Path;

/// Normalize a path string lexically.
///
/// - `\` becomes `/`
/// - empty and `.` segments are dropped
/// - `..` pops the previous segment; at the top of a relative path it is kept,
///   at the top of an absolute path it is dropped
/// - a leading `/` and a Windows drive prefix (`C:`) are preserved
pub fn normalize_path_string(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let absolute = unified.starts_with('/');

    let mut prefix = String::new();
    let mut rest = unified.as_str();
    if let Some((drive, tail)) = split_drive(rest) {
        prefix.push_str(drive);
        rest = tail;
    }
    let rooted = absolute || (!prefix.is_empty() && rest.starts_with('/'));

    let mut segments: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if rooted => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("{}/{}", prefix, joined),
        (false, true) if prefix.is_empty() => ".".to_string(),
        (false, _) => format!("{}{}", prefix, joined),
    }
}

/// `C:/foo` → `("C:", "/foo")`
fn split_drive(path: &str) -> Option<(&str, &str)> {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        Some(path.split_at(2))
    } else {
        None
    }
}

/// Convert a Path to a normalized key.
#[inline]
pub fn path_to_normalized_string(path: &Path) -> String {
    normalize_path_string(&path.to_string_lossy())
}

/// Join a normalized base with a relative tail and normalize the result.
pub fn join_normalized(base: &str, tail: &str) -> String {
    if tail.is_empty() {
        return normalize_path_string(base);
    }
    normalize_path_string(&format!("{}/{}", base, tail))
}

/// Directory part of a normalized key (`/p/src/a.ts` → `/p/src`).
pub fn parent_key(key: &str) -> &str {
    match key.rfind('/') {
        Some(0) => "/",
        Some(idx) => &key[..idx],
        None => ".",
    }
}

/// Express a normalized key relative to a normalized root.
///
/// Keys outside the root are returned unchanged.
pub fn relative_key<'a>(key: &'a str, root: &str) -> &'a str {
    let root = root.trim_end_matches('/');
    match key.strip_prefix(root) {
        Some(rest) if rest.starts_with('/') => &rest[1..],
        Some("") => ".",
        _ => key,
    }
}
