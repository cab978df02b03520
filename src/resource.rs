//! File identity and integrity checking.
//!
//! A [`FileResource`] binds a name to an on-disk path and can compute a
//! CRC32 + size fingerprint for it. Resources are constructed on demand by
//! the `create_*`/`find` factories; there is no registry behind them.
//!
//! The cached checksum is not invalidated when the underlying file changes
//! after it was computed; callers that need a fresh value construct a fresh
//! resource.

use std::env;
use std::fmt::{self, Display};
use std::fs;
use std::hash::{Hash, Hasher};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::checksum::Crc32;
use crate::codec;
use crate::error::FileError;
use crate::fs_ops;

/// Kind of a resource root or disk entry.
///
/// The integer value of each kind is part of the serialized contract and is
/// independent of declaration order; it must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum FileType {
    File,
    Directory,
    Vfs,
    Zip,
}

impl FileType {
    /// The contractual integer value of this kind.
    pub fn value(self) -> u8 {
        match self {
            FileType::File => 0,
            FileType::Zip => 1,
            FileType::Vfs => 2,
            FileType::Directory => 3,
        }
    }

    /// Look up a kind by its contractual integer value.
    pub fn from_value(value: u8) -> Option<FileType> {
        match value {
            0 => Some(FileType::File),
            1 => Some(FileType::Zip),
            2 => Some(FileType::Vfs),
            3 => Some(FileType::Directory),
            _ => None,
        }
    }
}

impl From<FileType> for u8 {
    fn from(kind: FileType) -> u8 {
        kind.value()
    }
}

impl TryFrom<u8> for FileType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        FileType::from_value(value).ok_or_else(|| format!("unknown file type value: {value}"))
    }
}

/// An identity object bound to an on-disk path.
///
/// Holds the decoded name the resource was requested under, the resolved
/// path, and a lazily computed CRC32. Size is always queried live from the
/// filesystem.
#[derive(Debug)]
pub struct FileResource {
    /// Decoded name the resource was requested under.
    name: String,

    /// Resolved absolute path.
    path: PathBuf,

    /// Cached CRC32; 0 means not yet computed.
    crc32: u32,
}

impl FileResource {
    /// Create a file resource, creating the file on disk if needed.
    pub fn create_file(name: &str) -> Result<FileResource, FileError> {
        Self::create(name, FileType::File)
    }

    /// Create a directory resource, creating the directory on disk if needed.
    pub fn create_directory(name: &str) -> Result<FileResource, FileError> {
        Self::create(name, FileType::Directory)
    }

    /// Create a resource of the given kind.
    ///
    /// The name is percent-decoded and resolved to an absolute path. If the
    /// path already exists the resource wraps it unchanged; otherwise parent
    /// directories are provisioned and the file or directory is created.
    ///
    /// # Errors
    /// Returns `FileError::CreationFailed` if creation fails or if `kind` is
    /// not a disk-creatable kind (only `File` and `Directory` are).
    pub fn create(name: &str, kind: FileType) -> Result<FileResource, FileError> {
        let resource = Self::resolve(name)?;
        if resource.exists() {
            return Ok(resource);
        }
        fs_ops::ensure_parent_dir_exists(&resource.path)?;
        match kind {
            FileType::File => {
                fs::File::create(&resource.path).map_err(|e| FileError::CreationFailed {
                    path: resource.path.clone(),
                    source: e,
                })?;
            }
            FileType::Directory => {
                fs::create_dir(&resource.path).map_err(|e| FileError::CreationFailed {
                    path: resource.path.clone(),
                    source: e,
                })?;
            }
            FileType::Vfs | FileType::Zip => {
                return Err(FileError::CreationFailed {
                    path: resource.path.clone(),
                    source: io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("kind {:?} is not disk-creatable", kind),
                    ),
                });
            }
        }
        debug!("created {:?} resource {}", kind, resource.path.display());
        Ok(resource)
    }

    /// Find an existing resource.
    ///
    /// # Errors
    /// Returns `FileError::NotFound` if the path does not exist.
    pub fn find(name: &str) -> Result<FileResource, FileError> {
        let resource = Self::resolve(name)?;
        if !resource.exists() {
            return Err(FileError::NotFound {
                path: resource.path.clone(),
                source: None,
            });
        }
        Ok(resource)
    }

    /// Decode a name and resolve it against the current directory.
    fn resolve(name: &str) -> Result<FileResource, FileError> {
        let decoded = codec::decode(name)?;
        let raw = PathBuf::from(&decoded);
        let path = if raw.is_absolute() {
            raw
        } else {
            env::current_dir().map(|cwd| cwd.join(&raw)).unwrap_or(raw)
        };
        Ok(FileResource {
            name: decoded,
            path,
            crc32: 0,
        })
    }

    /// The decoded name this resource was requested under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resolved absolute path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the path currently exists on disk.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Live size in bytes.
    ///
    /// Returns 0 when the metadata query fails; this accessor never errors.
    pub fn size(&self) -> u64 {
        fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }

    /// Read the whole file into memory.
    ///
    /// # Errors
    /// Returns `FileError::Corrupted` if the file is larger than `i32::MAX`
    /// bytes or cannot be read completely.
    pub fn read_bytes(&self) -> Result<Vec<u8>, FileError> {
        let len = fs::metadata(&self.path)
            .map_err(|e| FileError::Corrupted {
                path: self.path.clone(),
                reason: format!("cannot stat file: {e}"),
            })?
            .len();
        if len > i32::MAX as u64 {
            return Err(FileError::Corrupted {
                path: self.path.clone(),
                reason: "file too large to read into memory".to_string(),
            });
        }
        let mut file = fs::File::open(&self.path).map_err(|e| FileError::Corrupted {
            path: self.path.clone(),
            reason: format!("cannot open file: {e}"),
        })?;
        let mut bytes = Vec::with_capacity(len as usize);
        file.read_to_end(&mut bytes).map_err(|e| FileError::Corrupted {
            path: self.path.clone(),
            reason: format!("read failed: {e}"),
        })?;
        // The file may shrink between the stat and the read.
        if (bytes.len() as u64) < len {
            return Err(FileError::Corrupted {
                path: self.path.clone(),
                reason: "could not completely read file".to_string(),
            });
        }
        Ok(bytes)
    }

    /// CRC32 of the file content, computed on first use and cached.
    ///
    /// A computed value of 0 is indistinguishable from "not yet computed"
    /// and is recomputed on the next call.
    pub fn crc32(&mut self) -> Result<u32, FileError> {
        if self.crc32 != 0 {
            return Ok(self.crc32);
        }
        let bytes = self.read_bytes()?;
        let mut hasher = Crc32::new();
        hasher.update(&bytes);
        self.crc32 = hasher.finalize();
        Ok(self.crc32)
    }

    /// Canonical `name_crc32_size` fingerprint of the current on-disk state.
    ///
    /// The checksum is computed if it has not been already. Note the name is
    /// not escaped: a name containing `_` produces a fingerprint that cannot
    /// be parsed back.
    pub fn fingerprint(&mut self) -> Result<String, FileError> {
        let crc = self.crc32()?;
        Ok(format!("{}_{}_{}", self.name, crc, self.size()))
    }

    /// Verify this resource against a previously recorded fingerprint.
    ///
    /// Checks run in priority order and short-circuit: existence first, then
    /// size, then checksum. The checksum is only computed when the cheaper
    /// checks pass.
    ///
    /// # Errors
    /// - `FileError::Corrupted` if the fingerprint cannot be parsed
    /// - `FileError::NotFound` if the path no longer exists
    /// - `FileError::Corrupted` ("size does not match") on size mismatch
    /// - `FileError::Corrupted` ("crc32 does not match") on checksum mismatch
    pub fn check(&mut self, expected: &str) -> Result<(), FileError> {
        let fields: Vec<&str> = expected.split('_').collect();
        if fields.len() < 3 {
            return Err(FileError::Corrupted {
                path: self.path.clone(),
                reason: format!("malformed fingerprint: {expected}"),
            });
        }
        let expected_crc: u32 = fields[1].parse().map_err(|_| FileError::Corrupted {
            path: self.path.clone(),
            reason: format!("malformed fingerprint: {expected}"),
        })?;
        let expected_size: u64 = fields[2].parse().map_err(|_| FileError::Corrupted {
            path: self.path.clone(),
            reason: format!("malformed fingerprint: {expected}"),
        })?;

        if !self.exists() {
            return Err(FileError::NotFound {
                path: self.path.clone(),
                source: None,
            });
        }
        if self.size() != expected_size {
            return Err(FileError::Corrupted {
                path: self.path.clone(),
                reason: "size does not match".to_string(),
            });
        }
        if self.crc32()? != expected_crc {
            return Err(FileError::Corrupted {
                path: self.path.clone(),
                reason: "crc32 does not match".to_string(),
            });
        }
        Ok(())
    }

    /// Delete the file or directory from disk and reset this resource.
    ///
    /// # Errors
    /// Returns `FileError::DeletionFailed` if the filesystem delete fails.
    pub fn delete(&mut self) -> Result<(), FileError> {
        let result = if self.path.is_dir() {
            fs::remove_dir(&self.path)
        } else {
            fs::remove_file(&self.path)
        };
        result.map_err(|e| FileError::DeletionFailed {
            path: self.path.clone(),
            source: e,
        })?;
        debug!("deleted {}", self.path.display());
        self.name.clear();
        self.crc32 = 0;
        Ok(())
    }

    /// Rename or move the file, provisioning destination parents first.
    ///
    /// Returns a success flag instead of an error; callers must check it.
    /// Only works within a single physical volume.
    pub fn rename(&self, new_name: &str) -> bool {
        let destination = PathBuf::from(new_name);
        if let Err(e) = fs_ops::ensure_parent_dir_exists(&destination) {
            warn!("rename target parent for {} not created: {}", new_name, e);
            return false;
        }
        match fs::rename(&self.path, &destination) {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    "rename {} -> {} failed: {}",
                    self.path.display(),
                    new_name,
                    e
                );
                false
            }
        }
    }

    /// Recursively list all files under this directory resource.
    ///
    /// Directories are traversed, not returned. An entry whose path contains
    /// any of the `ignore` substrings is skipped, along with its whole
    /// subtree when it is a directory. Ordering follows filesystem
    /// enumeration.
    pub fn list_files(&self, ignore: &[&str]) -> Result<Vec<FileResource>, FileError> {
        let mut paths = Vec::new();
        fs_ops::collect_files(&self.path, ignore, &mut paths)?;
        paths
            .into_iter()
            .map(|p| FileResource::find(&p.to_string_lossy()))
            .collect()
    }
}

/// Strip both path separators so names compare across platforms.
fn unified_name(name: &str) -> String {
    name.chars().filter(|c| *c != '/' && *c != '\\').collect()
}

impl PartialEq for FileResource {
    /// Two resources are equal iff their cached checksums match, their names
    /// match (raw, or after stripping path separators), and their live sizes
    /// match.
    fn eq(&self, other: &Self) -> bool {
        if self.crc32 != other.crc32 {
            return false;
        }
        if self.name != other.name && unified_name(&self.name) != unified_name(&other.name) {
            return false;
        }
        self.size() == other.size()
    }
}

impl Eq for FileResource {}

impl Hash for FileResource {
    /// Hash is derived solely from the separator-stripped name. Unequal
    /// resources with the same stripped name therefore collide; this follows
    /// the equality contract, which never declares resources with differing
    /// stripped names equal.
    fn hash<H: Hasher>(&self, state: &mut H) {
        unified_name(&self.name).hash(state);
    }
}

impl Display for FileResource {
    /// `name_crc32_size` with the currently cached checksum (0 when it has
    /// not been computed; use [`FileResource::fingerprint`] for a verified
    /// string).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.name, self.crc32, self.size())
    }
}
