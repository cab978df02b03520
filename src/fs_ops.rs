//! Low-level filesystem operations.
//!
//! This module provides:
//! - Recursive directory-tree creation and deletion
//! - Parent-directory provisioning for file writes
//! - Recursive file collection with ignore substrings
//!
//! All operations are synchronous and open their own handles for the
//! duration of the call.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::FileError;

/// Create a directory and any missing intermediate directories.
///
/// Calling this on an already-existing directory succeeds silently.
///
/// # Errors
/// Returns `FileError::CreationFailed` if a non-directory file already
/// occupies the path, or if any level of the chain cannot be created.
pub fn create_directory_tree(path: &Path) -> Result<(), FileError> {
    if path.exists() && !path.is_dir() {
        return Err(FileError::CreationFailed {
            path: path.to_path_buf(),
            source: io::Error::new(
                io::ErrorKind::AlreadyExists,
                "path exists but is not a directory",
            ),
        });
    }
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| FileError::CreationFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

/// Create a single directory level.
///
/// Same occupied-by-file check as [`create_directory_tree`], but the parent
/// must already exist.
pub fn create_directory(path: &Path) -> Result<(), FileError> {
    if path.exists() && !path.is_dir() {
        return Err(FileError::CreationFailed {
            path: path.to_path_buf(),
            source: io::Error::new(
                io::ErrorKind::AlreadyExists,
                "path exists but is not a directory",
            ),
        });
    }
    if !path.exists() {
        fs::create_dir(path).map_err(|e| FileError::CreationFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

/// Delete a directory and its entire content.
///
/// Files are removed first, then each emptied directory bottom-up, finally
/// the root. The first entry that cannot be deleted aborts the walk with
/// `FileError::DeletionFailed` naming that entry; anything already removed
/// stays removed (no rollback).
pub fn delete_directory_tree(path: &Path) -> Result<(), FileError> {
    fn recurse(dir: &Path) -> Result<(), FileError> {
        let entries = fs::read_dir(dir).map_err(|e| FileError::DeletionFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;
        for entry in entries {
            let entry = entry.map_err(|e| FileError::DeletionFailed {
                path: dir.to_path_buf(),
                source: e,
            })?;
            let entry_path = entry.path();
            if entry_path.is_dir() {
                recurse(&entry_path)?;
            } else {
                fs::remove_file(&entry_path).map_err(|e| FileError::DeletionFailed {
                    path: entry_path.clone(),
                    source: e,
                })?;
            }
        }
        fs::remove_dir(dir).map_err(|e| FileError::DeletionFailed {
            path: dir.to_path_buf(),
            source: e,
        })
    }

    debug!("deleting directory tree {}", path.display());
    recurse(path)
}

/// Ensure the parent directory of a path exists, creating it if necessary.
///
/// # Errors
/// Returns `FileError::CreationFailed` if the parent exists as a
/// non-directory or cannot be created.
pub fn ensure_parent_dir_exists(path: &Path) -> Result<(), FileError> {
    if let Some(parent) = path.parent() {
        // Skip if parent is an empty path (relative root)
        if parent.as_os_str().is_empty() {
            return Ok(());
        }

        match fs::metadata(parent) {
            Ok(metadata) => {
                if metadata.is_dir() {
                    Ok(())
                } else {
                    Err(FileError::CreationFailed {
                        path: parent.to_path_buf(),
                        source: io::Error::new(
                            io::ErrorKind::InvalidInput,
                            "parent path exists but is not a directory",
                        ),
                    })
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(parent).map_err(|e| FileError::CreationFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })
            }
            Err(e) => Err(FileError::CreationFailed {
                path: parent.to_path_buf(),
                source: e,
            }),
        }
    } else {
        Ok(())
    }
}

/// Recursively collect every file under a directory.
///
/// Directories are traversed, not collected. An entry whose path string
/// contains any of the `ignore` substrings is skipped; when that entry is a
/// directory its whole subtree is skipped with it. Results come back in
/// filesystem-enumeration order.
///
/// # Errors
/// Returns `FileError::NotFound` if a directory in the walk cannot be read.
pub fn collect_files(
    root: &Path,
    ignore: &[&str],
    out: &mut Vec<PathBuf>,
) -> Result<(), FileError> {
    let entries = fs::read_dir(root).map_err(|e| FileError::NotFound {
        path: root.to_path_buf(),
        source: Some(e),
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| FileError::NotFound {
            path: root.to_path_buf(),
            source: Some(e),
        })?;
        let entry_path = entry.path();
        let as_text = entry_path.to_string_lossy();
        if ignore.iter().any(|pattern| as_text.contains(pattern)) {
            continue;
        }
        if entry_path.is_dir() {
            collect_files(&entry_path, ignore, out)?;
        } else {
            out.push(entry_path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_create_directory_tree_creates_chain() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let nested = temp_dir.path().join("a").join("b").join("c");

        create_directory_tree(&nested).expect("Failed to create tree");
        assert!(nested.is_dir());
    }

    #[test]
    fn test_create_directory_tree_is_idempotent() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let nested = temp_dir.path().join("a").join("b");

        create_directory_tree(&nested).expect("First call failed");
        create_directory_tree(&nested).expect("Second call failed");
        assert!(nested.is_dir());
    }

    #[test]
    fn test_create_directory_tree_fails_on_plain_file() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let occupied = temp_dir.path().join("occupied");
        fs::write(&occupied, b"data").expect("Failed to write file");

        let result = create_directory_tree(&occupied);
        assert!(matches!(result, Err(FileError::CreationFailed { .. })));
    }

    #[test]
    fn test_create_directory_single_level() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let dir = temp_dir.path().join("single");

        create_directory(&dir).expect("Failed to create directory");
        assert!(dir.is_dir());

        // Missing parent: the single-level variant must not provision it
        let orphan = temp_dir.path().join("missing").join("child");
        assert!(create_directory(&orphan).is_err());
    }

    #[test]
    fn test_delete_directory_tree_removes_everything() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp_dir.path().join("root");
        let sub = root.join("sub");
        fs::create_dir_all(&sub).expect("Failed to create dirs");
        fs::write(root.join("a.txt"), b"a").expect("Failed to write a");
        fs::write(sub.join("b.txt"), b"b").expect("Failed to write b");

        delete_directory_tree(&root).expect("Failed to delete tree");
        assert!(!root.exists());
    }

    #[test]
    fn test_delete_directory_tree_missing_root_fails() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let result = delete_directory_tree(&temp_dir.path().join("nope"));
        assert!(matches!(result, Err(FileError::DeletionFailed { .. })));
    }

    #[test]
    fn test_ensure_parent_dir_exists() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("subdir").join("file.txt");

        ensure_parent_dir_exists(&path).expect("Failed to create parent");
        assert!(path.parent().unwrap().exists());
    }

    #[test]
    fn test_ensure_parent_rejects_file_parent() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, b"x").expect("Failed to write blocker");

        let result = ensure_parent_dir_exists(&blocker.join("child.txt"));
        assert!(matches!(result, Err(FileError::CreationFailed { .. })));
    }

    #[test]
    fn test_collect_files_skips_ignored_entries() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp_dir.path();
        let sub = root.join("sub");
        fs::create_dir(&sub).expect("Failed to create sub");

        let mut file = fs::File::create(root.join("a.txt")).expect("Failed to create a.txt");
        file.write_all(b"a").expect("Failed to write a.txt");
        fs::write(root.join("skip.txt"), b"s").expect("Failed to write skip.txt");
        fs::write(sub.join("skip.txt"), b"s").expect("Failed to write sub skip.txt");

        let mut found = Vec::new();
        collect_files(root, &["skip.txt"], &mut found).expect("Failed to collect");

        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("a.txt"));
    }

    #[test]
    fn test_collect_files_skips_whole_ignored_subtree() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp_dir.path();
        let ignored = root.join("generated");
        fs::create_dir(&ignored).expect("Failed to create generated");
        fs::write(ignored.join("kept.txt"), b"k").expect("Failed to write kept.txt");
        fs::write(root.join("top.txt"), b"t").expect("Failed to write top.txt");

        let mut found = Vec::new();
        collect_files(root, &["generated"], &mut found).expect("Failed to collect");

        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("top.txt"));
    }
}
