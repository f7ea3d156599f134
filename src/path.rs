//! Hierarchical storage path model.
//!
//! Every backend addresses objects through paths in one canonical syntax:
//! segments separated by a single `/`, a leading `/`, no trailing `/`.
//! Backends translate to and from their native syntax at the adapter
//! boundary, so the generic engines never see vendor path quirks.

// ============================================================================
// Constants
// ============================================================================

/// Path separator between segments.
pub const SEPARATOR: char = '/';

/// The root folder path. The only path with a trailing separator.
pub const ROOT: &str = "/";

// ============================================================================
// Normalization
// ============================================================================

/// Normalize a path into canonical form.
///
/// Collapses repeated separators, drops empty and `.` segments, folds `..`
/// segments (never above the root), and trims whitespace-only input down to
/// the root. Normalization is idempotent: normalizing an already-normalized
/// path returns it unchanged.
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split(SEPARATOR) {
        match segment.trim() {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return ROOT.to_string();
    }

    let mut out = String::with_capacity(path.len() + 1);
    for segment in segments {
        out.push(SEPARATOR);
        out.push_str(segment);
    }
    out
}

/// True if the path normalizes to the root folder.
pub fn is_root(path: &str) -> bool {
    normalize(path) == ROOT
}

// ============================================================================
// Decomposition
// ============================================================================

/// Split a path into its normalized segments. The root splits into nothing.
pub fn split(path: &str) -> Vec<String> {
    normalize(path)
        .split(SEPARATOR)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// The last segment of a path, or `None` for the root.
pub fn name(path: &str) -> Option<String> {
    split(path).pop()
}

/// The containing folder of a path, or `None` for the root.
pub fn parent(path: &str) -> Option<String> {
    let mut segments = split(path);
    if segments.is_empty() {
        return None;
    }
    segments.pop();
    Some(combine(segments.iter().map(String::as_str)))
}

// ============================================================================
// Composition
// ============================================================================

/// Join path fragments into one normalized path.
///
/// Fragments may themselves contain separators; the result is normalized as
/// a whole, so `combine(["/a/", "b/c"])` yields `/a/b/c`.
pub fn combine<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    let mut joined = String::new();
    for part in parts {
        joined.push(SEPARATOR);
        joined.push_str(part);
    }
    normalize(&joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_canonical_form() {
        assert_eq!(normalize("a/b/c"), "/a/b/c");
        assert_eq!(normalize("/a/b/c/"), "/a/b/c");
        assert_eq!(normalize("//a///b//"), "/a/b");
        assert_eq!(normalize("a/./b"), "/a/b");
        assert_eq!(normalize("a/b/../c"), "/a/c");
    }

    #[test]
    fn normalize_root_forms() {
        assert_eq!(normalize(""), ROOT);
        assert_eq!(normalize("/"), ROOT);
        assert_eq!(normalize("///"), ROOT);
        assert_eq!(normalize(".."), ROOT);
        assert_eq!(normalize("a/.."), ROOT);
        assert_eq!(normalize("   "), ROOT);
    }

    #[test]
    fn normalize_is_idempotent() {
        for input in ["", "/", "a", "/a/b/c/", "//x//y", "a/../b/./c"] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn split_and_name_and_parent() {
        assert_eq!(split("/a/b/c"), vec!["a", "b", "c"]);
        assert!(split("/").is_empty());

        assert_eq!(name("/a/b/c"), Some("c".to_string()));
        assert_eq!(name("/"), None);

        assert_eq!(parent("/a/b/c"), Some("/a/b".to_string()));
        assert_eq!(parent("/a"), Some("/".to_string()));
        assert_eq!(parent("/"), None);
    }

    #[test]
    fn combine_joins_and_normalizes() {
        assert_eq!(combine(["a", "b", "c"]), "/a/b/c");
        assert_eq!(combine(["/a/", "b/c"]), "/a/b/c");
        assert_eq!(combine(["", "a"]), "/a");
        assert_eq!(combine(std::iter::empty::<&str>()), ROOT);
    }

    #[test]
    fn is_root_detection() {
        assert!(is_root("/"));
        assert!(is_root(""));
        assert!(is_root("a/.."));
        assert!(!is_root("/a"));
    }
}
