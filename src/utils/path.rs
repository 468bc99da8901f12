use core::fmt;

use itertools::join;
use thiserror::Error;

#[derive(Error, Clone, Debug, PartialEq, Eq, Default)]
#[error("Invalid path")]
pub struct PathError {}

pub fn validate_path(path: &str) -> bool {
    path.starts_with('/')
        && path
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '/')
}

/// Normalized channel path ("/sensors/gps"). Used to validate configured
/// topic names before any channel is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    path: String,
}

impl Path {
    pub fn from_str(path: &str) -> Result<Self, PathError> {
        if validate_path(path) {
            let path = format!("/{}", join(Self::split_parts(path), "/"));
            Ok(Path { path })
        } else {
            Err(PathError::default())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    pub fn iter_parts(&self) -> impl Iterator<Item = &str> {
        Self::split_parts(&self.path)
    }

    pub fn split_parts(path: &str) -> impl Iterator<Item = &str> {
        path.split('/').filter(|p| !p.is_empty())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("/a"));
        assert!(validate_path("/a/b/c"));
        assert!(validate_path("/a/b/c_1"));
        assert!(validate_path("/a//b"));
        assert!(validate_path("/"));

        assert!(!validate_path("a"));
        assert!(!validate_path("a/b"));
        assert!(!validate_path("/a/b /c"));
        assert!(!validate_path("/a!/b"));
    }

    #[test]
    fn test_path_normalization() {
        assert_eq!(Path::from_str("/a/b/").unwrap().as_str(), "/a/b");
        assert_eq!(Path::from_str("///a///b").unwrap().as_str(), "/a/b");

        assert_eq!(Path::from_str("a/b"), Err(PathError::default()));
    }

    #[test]
    fn test_path_iter_parts() {
        let path = Path::from_str("/a/b/c").unwrap();
        let parts: Vec<_> = path.iter_parts().collect();
        assert_eq!(parts, vec!["a", "b", "c"]);
    }
}
