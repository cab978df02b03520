//! Named resource roots.
//!
//! A [`ResourcePath`] pairs a name with a root location and a kind, and can
//! answer whether a relative entry exists under it. A VFS-kind root is not
//! disk-backed, so its entries are defined to always exist.

use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::resource::FileType;

/// A named root used to locate resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePath {
    name: String,
    path: String,
    kind: FileType,
}

impl ResourcePath {
    /// A virtual root; entry existence checks always succeed.
    pub fn vfs(name: &str, path: &str) -> ResourcePath {
        ResourcePath {
            name: name.to_string(),
            path: path.to_string(),
            kind: FileType::Vfs,
        }
    }

    /// A disk-backed directory root.
    pub fn directory(name: &str, path: &str) -> ResourcePath {
        ResourcePath {
            name: name.to_string(),
            path: path.to_string(),
            kind: FileType::Directory,
        }
    }

    /// A directory root at the process working directory.
    pub fn current_directory_named(name: &str) -> ResourcePath {
        let path = env::current_dir()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|_| ".".to_string());
        ResourcePath {
            name: name.to_string(),
            path,
            kind: FileType::Directory,
        }
    }

    /// A working-directory root with a generated unique name.
    pub fn current_directory() -> ResourcePath {
        Self::current_directory_named(&format!("resource-path-{}", Uuid::new_v4()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> FileType {
        self.kind
    }

    /// Whether the root itself exists on disk.
    pub fn exists(&self) -> bool {
        Path::new(&self.path).exists()
    }

    /// Whether a relative entry exists under this root.
    ///
    /// A VFS root reports true without touching disk.
    pub fn entry_exists(&self, entry: &str) -> bool {
        self.kind == FileType::Vfs || Path::new(&self.path).join(entry).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_vfs_entries_always_exist() {
        let root = ResourcePath::vfs("packed", "/nowhere/at/all");
        assert_eq!(root.kind(), FileType::Vfs);
        assert!(root.entry_exists("anything.dat"));
        assert!(!root.exists());
    }

    #[test]
    fn test_directory_entries_consult_disk() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join("present.txt"), b"x").expect("Failed to write");

        let root = ResourcePath::directory("media", &temp_dir.path().to_string_lossy());
        assert!(root.exists());
        assert!(root.entry_exists("present.txt"));
        assert!(!root.entry_exists("absent.txt"));
    }

    #[test]
    fn test_current_directory_generates_unique_names() {
        let first = ResourcePath::current_directory();
        let second = ResourcePath::current_directory();
        assert_ne!(first.name(), second.name());
        assert_eq!(first.path(), second.path());
        assert_eq!(first.kind(), FileType::Directory);
    }

    #[test]
    fn test_serde_round_trip() {
        let root = ResourcePath::directory("media", "/srv/media");
        let json = serde_json::to_string(&root).expect("Failed to serialize");
        // Kind is stored as its contractual integer value.
        assert!(json.contains("\"kind\":3"));
        let back: ResourcePath = serde_json::from_str(&json).expect("Failed to parse");
        assert_eq!(back, root);
    }
}
