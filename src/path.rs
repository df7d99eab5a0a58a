//! Lexical path resolution and ancestry predicates.
//!
//! Everything here is pure: `.` and `..` segments are collapsed without
//! touching the filesystem, so resolution is deterministic and symlinks are
//! never followed. Comparisons elsewhere in the crate are always made on
//! resolved forms, never on raw input strings.

use std::env;
use std::path::{Component, Path, PathBuf};

/// Collapse `.` and `..` segments lexically.
///
/// `..` at the root is dropped; leading `..` on a relative path is kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let ends_with_segment =
                    matches!(out.components().next_back(), Some(Component::Normal(_)));
                if ends_with_segment {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve `path` against `base`, producing a normalized absolute form.
///
/// Absolute inputs are normalized as-is; relative inputs are joined onto
/// `base` first.
pub fn resolve(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base.join(path))
    }
}

/// Resolve `path` against the process working directory.
pub fn resolve_cwd(path: &Path) -> PathBuf {
    let base = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    resolve(path, &base)
}

/// Strip `ancestor` from `path`, but only on a true path-segment boundary.
///
/// A textual prefix that does not end at a separator does not match:
/// `relative_to("one", "one_two")` returns `one_two` unchanged. Empty
/// inputs, an identical pair, or an absolute/relative mismatch also return
/// `path` unchanged.
pub fn relative_to<'a>(ancestor: &Path, path: &'a Path) -> &'a Path {
    if ancestor.as_os_str().is_empty() || path.as_os_str().is_empty() {
        return path;
    }
    match path.strip_prefix(ancestor) {
        Ok(rest) if !rest.as_os_str().is_empty() => rest,
        _ => path,
    }
}

/// True iff `path` lies strictly inside `ancestor`'s subtree.
///
/// Segment-boundary matching as in [`relative_to`]; a path is not a
/// descendant of itself. This predicate decides both whether sync endpoints
/// are nested and whether a symlink target escapes its codebase root, so
/// callers hand it resolved, `..`-free paths.
pub fn is_descendant(ancestor: &Path, path: &Path) -> bool {
    if ancestor.as_os_str().is_empty() {
        return false;
    }
    match path.strip_prefix(ancestor) {
        Ok(rest) => !rest.as_os_str().is_empty(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_dot_segments() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("a/b/../../d")), PathBuf::from("d"));
    }

    #[test]
    fn test_normalize_parent_at_root_is_dropped() {
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
    }

    #[test]
    fn test_normalize_keeps_leading_parent_on_relative() {
        assert_eq!(normalize(Path::new("../a")), PathBuf::from("../a"));
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    fn test_resolve_joins_relative_onto_base() {
        assert_eq!(
            resolve(Path::new("sub/dir"), Path::new("/base")),
            PathBuf::from("/base/sub/dir")
        );
        assert_eq!(
            resolve(Path::new("../peer"), Path::new("/base/inner")),
            PathBuf::from("/base/peer")
        );
    }

    #[test]
    fn test_resolve_ignores_base_for_absolute_input() {
        assert_eq!(
            resolve(Path::new("/other"), Path::new("/base")),
            PathBuf::from("/other")
        );
    }

    #[test]
    fn test_relative_to_strips_on_segment_boundary() {
        assert_eq!(
            relative_to(Path::new("one"), Path::new("one/two")),
            Path::new("two")
        );
    }

    #[test]
    fn test_relative_to_rejects_textual_prefix() {
        // "one" is not a segment prefix of "one_two".
        assert_eq!(
            relative_to(Path::new("one"), Path::new("one_two")),
            Path::new("one_two")
        );
    }

    #[test]
    fn test_relative_to_empty_inputs_unchanged() {
        assert_eq!(relative_to(Path::new(""), Path::new("")), Path::new(""));
        assert_eq!(
            relative_to(Path::new(""), Path::new("a/b")),
            Path::new("a/b")
        );
        assert_eq!(relative_to(Path::new("a/b"), Path::new("")), Path::new(""));
    }

    #[test]
    fn test_relative_to_identical_paths_unchanged() {
        assert_eq!(
            relative_to(Path::new("/a/b"), Path::new("/a/b")),
            Path::new("/a/b")
        );
    }

    #[test]
    fn test_relative_to_mismatched_absoluteness_unchanged() {
        assert_eq!(
            relative_to(Path::new("/one"), Path::new("one/two")),
            Path::new("one/two")
        );
    }

    #[test]
    fn test_is_descendant() {
        assert!(is_descendant(Path::new("/a"), Path::new("/a/b")));
        assert!(is_descendant(Path::new("/a"), Path::new("/a/b/c")));
        assert!(!is_descendant(Path::new("/a"), Path::new("/a")));
        assert!(!is_descendant(Path::new("/a"), Path::new("/ab")));
        assert!(!is_descendant(Path::new("/a/b"), Path::new("/a")));
        assert!(!is_descendant(Path::new(""), Path::new("/a")));
    }
}
