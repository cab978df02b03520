//! # Filekit - File Handling Utilities
//!
//! A small synchronous library for everyday file handling: file identity
//! and integrity checking, directory-tree operations, key=value property
//! files, and zip-archive extraction.
//!
//! ## Overview
//!
//! The central type is [`FileResource`], an identity object bound to an
//! on-disk path. It features:
//! - Create/find/rename/delete operations with typed errors
//! - A CRC32 + size fingerprint (`name_crc32_size`) for integrity checks
//! - Recursive file listing with ignore substrings
//! - Cross-platform name equality (path separators stripped)
//!
//! Around it sit directory-tree operations, a property-file store, and a
//! zip extractor supporting root-stripped and subdirectory extraction.
//!
//! Everything is blocking, single-threaded I/O; every operation opens and
//! closes its own handles. Concurrent external mutation of a path during an
//! operation surfaces as an I/O failure, never as a hung call.
//!
//! ## Basic Usage
//!
//! ```no_run
//! use filekit::FileResource;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Record a file's identity
//! let mut resource = FileResource::create_file("data/save.bin")?;
//! let fingerprint = resource.fingerprint()?;
//!
//! // Later: verify it has not been modified
//! let mut found = FileResource::find("data/save.bin")?;
//! found.check(&fingerprint)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - **resource**: `FileResource` identity object and `FileType`
//! - **resource_path**: named resource roots (disk-backed or virtual)
//! - **fs_ops**: directory-tree creation/deletion, recursive collection
//! - **checksum**: CRC32 computation
//! - **properties**: key=value property file load/save
//! - **archive**: zip reading and extraction
//! - **codec**: name decoding and UTF-8 conversions
//! - **error**: the `FileError` type

pub mod archive;
pub mod checksum;
pub mod codec;
pub mod error;
pub mod fs_ops;
pub mod properties;
pub mod resource;
pub mod resource_path;

// Re-export main types and functions
pub use archive::{extract_files, extract_files_from_directory, list_entries, ZipEntry};
pub use checksum::{crc32_of, Crc32};
pub use error::FileError;
pub use fs_ops::{create_directory_tree, delete_directory_tree};
pub use properties::{
    get_or_create_properties_from_file, get_properties_from_file, save, Properties,
};
pub use resource::{FileResource, FileType};
pub use resource_path::ResourcePath;
