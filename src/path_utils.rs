//! Path identity helpers
//!
//! Cache and output locations arrive as given on the command line, relative or
//! absolute, with `.` and `..` segments. Comparing them needs one normalized
//! form.

use normpath::PathExt;
use std::path::{Path, PathBuf};

/// Normalize a path for comparison
///
/// Resolves the path if it exists. For a path that does not exist yet, the
/// longest existing ancestor is resolved and the remaining components are
/// appended, so a directory compares equal before and after it is created.
pub fn normalize(path: &Path) -> PathBuf {
    if let Ok(norm) = path.normalize() {
        return norm.into_path_buf();
    }

    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut current = absolute.as_path();
    let mut components = Vec::new();

    while !current.exists() {
        let (Some(file_name), Some(parent)) = (current.file_name(), current.parent()) else {
            return absolute;
        };
        components.push(file_name);
        current = parent;
    }

    let mut result = current
        .normalize()
        .map(normpath::BasePathBuf::into_path_buf)
        .unwrap_or_else(|_| current.to_path_buf());
    for component in components.iter().rev() {
        result.push(component);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::create_temp_dir;

    #[test]
    fn test_existing_path_with_parent_segments() {
        let temp = create_temp_dir();
        let dir = temp.path().join("a");
        std::fs::create_dir_all(&dir).unwrap();

        assert_eq!(normalize(&dir.join("..").join("a")), normalize(&dir));
        assert_eq!(normalize(&dir.join(".")), normalize(&dir));
    }

    #[test]
    fn test_missing_path_matches_after_creation() {
        let temp = create_temp_dir();
        let missing = temp.path().join("out").join("local");
        let before = normalize(&missing);

        std::fs::create_dir_all(&missing).unwrap();
        assert_eq!(before, normalize(&missing));
    }

    #[test]
    fn test_relative_path_becomes_absolute() {
        assert!(normalize(Path::new("does-not-exist/local")).is_absolute());
    }
}
