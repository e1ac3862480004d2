//! Path segments and their string syntax.
//!
//! A path is `/`-separated. Each non-empty component is either:
//! - `~N` -- an index segment selecting the `N`th child by position
//! - anything else -- a name segment selecting a child by name
//!
//! Empty components (leading, trailing or doubled slashes) are ignored, so
//! `""`, `"/"` and `"//"` all denote the root. `.` and `..` are rejected;
//! paths never traverse upward.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Marker that introduces an index segment.
const INDEX_MARKER: char = '~';

/// One step of a path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathSegment {
    /// Select a child by name.
    Name(String),
    /// Select a child by its position in the directory.
    Index(usize),
}

impl PathSegment {
    /// Returns `true` for a name segment.
    pub fn is_name(&self) -> bool {
        matches!(self, Self::Name(_))
    }

    /// The name, for name segments.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Index(_) => None,
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{name}"),
            Self::Index(index) => write!(f, "{INDEX_MARKER}{index}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Parse a path string into an ordered list of segments.
///
/// # Examples
///
/// ```
/// use casfs_types::{parse_path, PathSegment};
///
/// let segments = parse_path("src/~1/main.rs").unwrap();
/// assert_eq!(segments, vec![
///     PathSegment::Name("src".into()),
///     PathSegment::Index(1),
///     PathSegment::Name("main.rs".into()),
/// ]);
/// assert!(parse_path("").unwrap().is_empty());
/// assert!(parse_path("a/../b").is_err());
/// ```
pub fn parse_path(path: &str) -> Result<Vec<PathSegment>, TypeError> {
    path.split('/')
        .filter(|component| !component.is_empty())
        .map(|component| parse_component(path, component))
        .collect()
}

fn parse_component(path: &str, component: &str) -> Result<PathSegment, TypeError> {
    if component == "." || component == ".." {
        return Err(TypeError::InvalidPath {
            path: path.to_string(),
            reason: format!("relative component {component:?} is not allowed"),
        });
    }

    let Some(digits) = component.strip_prefix(INDEX_MARKER) else {
        return Ok(PathSegment::Name(component.to_string()));
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TypeError::InvalidPath {
            path: path.to_string(),
            reason: format!("index segment must be ~<digits>, got {component:?}"),
        });
    }

    digits
        .parse::<usize>()
        .map(PathSegment::Index)
        .map_err(|e| TypeError::InvalidPath {
            path: path.to_string(),
            reason: format!("index out of range in {component:?}: {e}"),
        })
}

/// Render segments in canonical form (no leading or trailing slash).
pub fn format_path(segments: &[PathSegment]) -> String {
    segments
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn name(s: &str) -> PathSegment {
        PathSegment::Name(s.into())
    }

    #[test]
    fn root_forms() {
        assert!(parse_path("").unwrap().is_empty());
        assert!(parse_path("/").unwrap().is_empty());
        assert!(parse_path("///").unwrap().is_empty());
    }

    #[test]
    fn mixed_segments() {
        let segments = parse_path("/a/~0/b.txt/").unwrap();
        assert_eq!(segments, vec![name("a"), PathSegment::Index(0), name("b.txt")]);
    }

    #[test]
    fn doubled_slashes_collapse() {
        assert_eq!(parse_path("a//b").unwrap(), vec![name("a"), name("b")]);
    }

    #[test]
    fn tilde_inside_name_is_a_name() {
        assert_eq!(parse_path("backup~1").unwrap(), vec![name("backup~1")]);
    }

    #[test]
    fn malformed_index_rejected() {
        assert!(parse_path("~").is_err());
        assert!(parse_path("a/~x").is_err());
        assert!(parse_path("~-1").is_err());
        assert!(parse_path("~99999999999999999999999999").is_err());
    }

    #[test]
    fn relative_components_rejected() {
        let err = parse_path("a/./b").unwrap_err();
        assert!(matches!(err, TypeError::InvalidPath { .. }));
        assert!(parse_path("..").is_err());
    }

    #[test]
    fn format_is_canonical() {
        let segments = parse_path("//src/~3/lib.rs/").unwrap();
        assert_eq!(format_path(&segments), "src/~3/lib.rs");
        assert_eq!(format_path(&[]), "");
    }

    #[test]
    fn segment_helpers() {
        assert!(name("a").is_name());
        assert_eq!(name("a").as_name(), Some("a"));
        assert_eq!(PathSegment::from(2usize).as_name(), None);
        assert_eq!(PathSegment::from("x"), name("x"));
    }

    proptest! {
        #[test]
        fn canonical_form_reparses_identically(
            parts in proptest::collection::vec("[a-z0-9._-]{1,8}|~[0-9]{1,4}", 0..6)
        ) {
            let raw = parts.join("/");
            match parse_path(&raw) {
                Ok(segments) => {
                    let canonical = format_path(&segments);
                    prop_assert_eq!(parse_path(&canonical).unwrap(), segments);
                }
                // Only `.`/`..` components can be rejected by this generator.
                Err(_) => prop_assert!(parts.iter().any(|p| p == "." || p == "..")),
            }
        }
    }
}
