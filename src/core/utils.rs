//! String and host-path helpers shared by the path layer and the storage backends.

use std::path::{Component, Path, PathBuf};

/// Separator of canonical asset paths.
pub const SEPARATOR: char = '/';

/// Returns `true` for empty and whitespace-only strings.
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Returns `true` if `s` contains a forward or backward slash.
pub fn has_separator(s: &str) -> bool {
    s.contains(['/', '\\'])
}

pub fn to_forward_slashes(s: &str) -> String {
    s.replace('\\', "/")
}

/// Returns `true` for `C:/...` style paths (after separator canonicalization).
pub fn has_drive_letter(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Strips `prefix` from `path` when `path` equals `prefix` or continues with a separator.
/// Returns the remainder, which is either empty or starts with `/`.
pub fn strip_dir_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let prefix = prefix.trim_end_matches(SEPARATOR);
    if prefix.is_empty() {
        return None;
    }
    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() || rest.starts_with(SEPARATOR) {
        Some(rest)
    } else {
        None
    }
}

/// Splits a forward-slash path into segments, dropping empty and `.` segments
/// and resolving `..` against the previous segment.
/// Returns `None` if a `..` would climb above the first segment.
pub fn normalize_segments(path: &str) -> Option<Vec<&str>> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(SEPARATOR) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
                if segments.is_empty() {
                    return None;
                }
            }
            _ => segments.push(segment),
        }
    }
    Some(segments)
}

/// Appends `extension` to `name`, adding the leading dot when it is missing.
/// Without an extension, `name` is kept if it already carries one, otherwise `default` is used.
pub fn with_extension(name: &str, extension: Option<&str>, default: &str) -> String {
    match extension {
        Some(ext) => format!("{}.{}", name, ext.trim_start_matches('.')),
        None if name.rfind('.').is_some_and(|i| i > 0 && i + 1 < name.len()) => name.to_string(),
        None => format!("{}.{}", name, default.trim_start_matches('.')),
    }
}

/// Normalizes a host path: resolves `.` and `..` and drops the trailing separator.
pub fn normalize<P: AsRef<Path>>(path: P) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.as_ref().components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if result.parent().is_some() {
                    result.pop();
                }
            }
            _ => result.push(component),
        }
    }
    result
}

/// Removes a file or a directory tree on the host.
pub fn rm_on_host<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
    let path = path.as_ref();
    if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    }
}
