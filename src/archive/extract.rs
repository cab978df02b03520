//! Archive extraction operations.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, info};

use crate::codec;
use crate::error::FileError;
use crate::fs_ops;

use super::reader::ZipReader;
use super::structures::ZipEntry;

/// List the entries of a zip archive without extracting anything.
pub fn list_entries(zip: &Path) -> Result<Vec<ZipEntry>, FileError> {
    open(zip)?.entries()
}

/// Extract every entry of a zip archive into a destination directory.
///
/// With `keep_root_dir == false`, the first directory entry encountered is
/// recorded as the archive root and stripped as a prefix from every
/// subsequent entry path; the root directory itself is not created.
///
/// # Errors
/// Returns `FileError::Archive` if the archive cannot be opened or an entry
/// fails to extract, and `FileError::CreationFailed` if a destination
/// directory cannot be provisioned.
pub fn extract_files(
    zip: &Path,
    destination: &Path,
    keep_root_dir: bool,
) -> Result<(), FileError> {
    let reader = open(zip)?;
    let entries = reader.entries()?;
    fs_ops::create_directory_tree(destination)?;

    let mut root = String::new();
    for entry in &entries {
        if entry.is_dir {
            if !keep_root_dir && root.is_empty() {
                root = entry.name.clone();
                continue;
            }
            fs_ops::create_directory_tree(&destination.join(strip_root(&entry.name, &root)))?;
        } else {
            write_entry(
                &reader,
                entry,
                &destination.join(strip_root(&entry.name, &root)),
            )?;
        }
    }
    info!(
        "extracted {} into {}",
        reader.path().display(),
        destination.display()
    );
    Ok(())
}

/// Extract only the entries under one archive subdirectory.
///
/// Entries whose `/`-normalized path starts with `directory/` are written to
/// the destination with their full archive-relative path preserved; all
/// other entries are ignored.
pub fn extract_files_from_directory(
    zip: &Path,
    directory: &str,
    destination: &Path,
) -> Result<(), FileError> {
    let reader = open(zip)?;
    let entries = reader.entries()?;
    let prefix = format!("{}/", directory.trim_end_matches('/'));
    fs_ops::create_directory_tree(&destination.join(directory))?;

    for entry in entries.iter().filter(|e| e.name.starts_with(&prefix)) {
        let target = destination.join(&entry.name);
        if entry.is_dir {
            fs_ops::create_directory_tree(&target)?;
        } else {
            write_entry(&reader, entry, &target)?;
        }
    }
    Ok(())
}

/// Remove the recorded root prefix from an entry path.
fn strip_root<'a>(name: &'a str, root: &str) -> &'a str {
    if root.is_empty() {
        name
    } else {
        name.strip_prefix(root).unwrap_or(name)
    }
}

/// Decode the archive name and open it.
fn open(zip: &Path) -> Result<ZipReader, FileError> {
    let decoded = codec::decode(&zip.to_string_lossy()).map_err(|e| FileError::Archive {
        path: zip.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidData, e.to_string()),
    })?;
    ZipReader::open(Path::new(&decoded))
}

/// Stream one entry to its destination path, then restore its timestamp.
fn write_entry(reader: &ZipReader, entry: &ZipEntry, target: &Path) -> Result<(), FileError> {
    fs_ops::ensure_parent_dir_exists(target)?;
    let mut out = fs::File::create(target).map_err(|e| FileError::Archive {
        path: target.to_path_buf(),
        source: e,
    })?;
    reader.extract_entry(entry, &mut out)?;
    drop(out);
    restore_mtime(entry, target);
    debug!("extracted {} -> {}", entry.name, target.display());
    Ok(())
}

/// Apply the entry's recorded modification time, best effort.
fn restore_mtime(entry: &ZipEntry, target: &Path) {
    if let Some(modified) = entry.modified() {
        let mtime = filetime::FileTime::from_unix_time(modified.and_utc().timestamp(), 0);
        let _ = filetime::set_file_mtime(target, mtime);
    }
}
