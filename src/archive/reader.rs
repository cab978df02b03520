//! Seek-based zip archive reading.
//!
//! Zip files are read from the end: the End of Central Directory record is
//! located in the file tail (tolerating a trailing comment), the central
//! directory is parsed for entry metadata, and each entry's data offset is
//! resolved through its local file header only when the entry is actually
//! extracted. ZIP64 archives are handled transparently.

use std::fs;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt};
use flate2::read::DeflateDecoder;
use tracing::debug;

use crate::checksum::Crc32;
use crate::error::FileError;

use super::structures::{
    CompressionMethod, EndOfCentralDirectory, Zip64Locator, Zip64Record, ZipEntry,
    CENTRAL_HEADER_SIGNATURE, LOCAL_HEADER_SIGNATURE, LOCAL_HEADER_SIZE,
};

/// Maximum zip comment size allowed by the format; bounds the EOCD search.
const MAX_COMMENT_SIZE: u64 = 65_535;

/// Read-only handle on a zip archive.
pub struct ZipReader {
    file: fs::File,
    path: PathBuf,
    size: u64,
}

impl ZipReader {
    /// Open an archive for reading.
    ///
    /// # Errors
    /// Returns `FileError::Archive` if the file cannot be opened or its
    /// metadata queried.
    pub fn open(path: &Path) -> Result<ZipReader, FileError> {
        let file = fs::File::open(path).map_err(|e| FileError::Archive {
            path: path.to_path_buf(),
            source: e,
        })?;
        let size = file
            .metadata()
            .map_err(|e| FileError::Archive {
                path: path.to_path_buf(),
                source: e,
            })?
            .len();
        Ok(ZipReader {
            file,
            path: path.to_path_buf(),
            size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn archive_error(&self, source: io::Error) -> FileError {
        FileError::Archive {
            path: self.path.clone(),
            source,
        }
    }

    fn invalid(&self, message: &str) -> FileError {
        self.archive_error(io::Error::new(io::ErrorKind::InvalidData, message.to_string()))
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<(), FileError> {
        let mut handle = &self.file;
        handle
            .seek(SeekFrom::Start(offset))
            .and_then(|_| handle.read_exact(buf))
            .map_err(|e| self.archive_error(e))
    }

    /// List every entry recorded in the central directory.
    pub fn entries(&self) -> Result<Vec<ZipEntry>, FileError> {
        let (eocd, eocd_offset) = self.find_eocd()?;

        let (cd_offset, cd_size, total_entries) = if eocd.is_zip64() {
            let record = self.read_zip64(eocd_offset)?;
            (record.cd_offset, record.cd_size, record.total_entries)
        } else {
            (
                u64::from(eocd.cd_offset),
                u64::from(eocd.cd_size),
                u64::from(eocd.total_entries),
            )
        };

        let mut cd_data = vec![0u8; cd_size as usize];
        self.read_at(cd_offset, &mut cd_data)?;

        let mut entries = Vec::with_capacity(total_entries as usize);
        let mut cursor = Cursor::new(cd_data.as_slice());
        for _ in 0..total_entries {
            entries.push(self.parse_central_header(&mut cursor)?);
        }
        debug!(
            "listed {} entries from {}",
            entries.len(),
            self.path.display()
        );
        Ok(entries)
    }

    /// Locate the End of Central Directory record in the file tail.
    fn find_eocd(&self) -> Result<(EndOfCentralDirectory, u64), FileError> {
        let record_size = EndOfCentralDirectory::SIZE;
        if self.size < record_size as u64 {
            return Err(self.invalid("not a zip archive"));
        }

        // Common case first: no trailing comment, record flush at the end.
        let tail_offset = self.size - record_size as u64;
        let mut buf = vec![0u8; record_size];
        self.read_at(tail_offset, &mut buf)?;
        if &buf[0..4] == EndOfCentralDirectory::SIGNATURE && &buf[20..22] == b"\x00\x00" {
            let eocd = EndOfCentralDirectory::from_bytes(&buf)
                .map_err(|e| self.archive_error(e))?;
            return Ok((eocd, tail_offset));
        }

        // A comment pushes the record inward; scan the tail backwards for a
        // signature whose comment length matches the remaining bytes.
        let window = (MAX_COMMENT_SIZE + record_size as u64).min(self.size);
        let window_start = self.size - window;
        let mut buf = vec![0u8; window as usize];
        self.read_at(window_start, &mut buf)?;

        for i in (0..=buf.len() - record_size).rev() {
            if &buf[i..i + 4] != EndOfCentralDirectory::SIGNATURE {
                continue;
            }
            let comment_len = u16::from_le_bytes([buf[i + 20], buf[i + 21]]) as usize;
            if comment_len == buf.len() - i - record_size {
                let eocd = EndOfCentralDirectory::from_bytes(&buf[i..i + record_size])
                    .map_err(|e| self.archive_error(e))?;
                return Ok((eocd, window_start + i as u64));
            }
        }

        Err(self.invalid("not a zip archive"))
    }

    /// Follow the ZIP64 locator sitting just before the regular record.
    fn read_zip64(&self, eocd_offset: u64) -> Result<Zip64Record, FileError> {
        if eocd_offset < Zip64Locator::SIZE as u64 {
            return Err(self.invalid("zip64 locator missing"));
        }
        let mut locator_buf = vec![0u8; Zip64Locator::SIZE];
        self.read_at(eocd_offset - Zip64Locator::SIZE as u64, &mut locator_buf)?;
        let locator =
            Zip64Locator::from_bytes(&locator_buf).map_err(|e| self.archive_error(e))?;

        let mut record_buf = vec![0u8; Zip64Record::MIN_SIZE];
        self.read_at(locator.eocd64_offset, &mut record_buf)?;
        Zip64Record::from_bytes(&record_buf).map_err(|e| self.archive_error(e))
    }

    /// Parse one central directory file header at the cursor position.
    fn parse_central_header(&self, cursor: &mut Cursor<&[u8]>) -> Result<ZipEntry, FileError> {
        let mut parse = || -> io::Result<ZipEntry> {
            let mut sig = [0u8; 4];
            cursor.read_exact(&mut sig)?;
            if sig != CENTRAL_HEADER_SIGNATURE {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "invalid central directory header",
                ));
            }

            let _version_made_by = cursor.read_u16::<LittleEndian>()?;
            let _version_needed = cursor.read_u16::<LittleEndian>()?;
            let _flags = cursor.read_u16::<LittleEndian>()?;
            let method = cursor.read_u16::<LittleEndian>()?;
            let mod_time = cursor.read_u16::<LittleEndian>()?;
            let mod_date = cursor.read_u16::<LittleEndian>()?;
            let crc32 = cursor.read_u32::<LittleEndian>()?;
            let mut compressed_size = u64::from(cursor.read_u32::<LittleEndian>()?);
            let mut uncompressed_size = u64::from(cursor.read_u32::<LittleEndian>()?);
            let name_len = cursor.read_u16::<LittleEndian>()?;
            let extra_len = cursor.read_u16::<LittleEndian>()?;
            let comment_len = cursor.read_u16::<LittleEndian>()?;
            let _disk_number_start = cursor.read_u16::<LittleEndian>()?;
            let _internal_attrs = cursor.read_u16::<LittleEndian>()?;
            let _external_attrs = cursor.read_u32::<LittleEndian>()?;
            let mut header_offset = u64::from(cursor.read_u32::<LittleEndian>()?);

            let mut name_bytes = vec![0u8; name_len as usize];
            cursor.read_exact(&mut name_bytes)?;
            let name = String::from_utf8_lossy(&name_bytes).to_string();
            let is_dir = name.ends_with('/');

            // ZIP64 values live in extra field 0x0001, present per-field for
            // every header value carrying the 32-bit sentinel.
            let extra_end = cursor.position() + u64::from(extra_len);
            while cursor.position() + 4 <= extra_end {
                let header_id = cursor.read_u16::<LittleEndian>()?;
                let field_size = cursor.read_u16::<LittleEndian>()?;
                if header_id == 0x0001 {
                    if uncompressed_size == 0xFFFF_FFFF && cursor.position() + 8 <= extra_end {
                        uncompressed_size = cursor.read_u64::<LittleEndian>()?;
                    }
                    if compressed_size == 0xFFFF_FFFF && cursor.position() + 8 <= extra_end {
                        compressed_size = cursor.read_u64::<LittleEndian>()?;
                    }
                    if header_offset == 0xFFFF_FFFF && cursor.position() + 8 <= extra_end {
                        header_offset = cursor.read_u64::<LittleEndian>()?;
                    }
                    break;
                }
                cursor.set_position(cursor.position() + u64::from(field_size));
            }
            cursor.set_position(extra_end + u64::from(comment_len));

            Ok(ZipEntry {
                name,
                method: CompressionMethod::from_u16(method),
                compressed_size,
                uncompressed_size,
                crc32,
                header_offset,
                mod_time,
                mod_date,
                is_dir,
            })
        };
        parse().map_err(|e| self.archive_error(e))
    }

    /// Resolve where an entry's data begins.
    ///
    /// The local header repeats the variable-length name and extra field, so
    /// the data offset can only be computed by reading it.
    pub fn data_offset(&self, entry: &ZipEntry) -> Result<u64, FileError> {
        let mut header = vec![0u8; LOCAL_HEADER_SIZE];
        self.read_at(entry.header_offset, &mut header)?;
        if &header[0..4] != LOCAL_HEADER_SIGNATURE {
            return Err(self.invalid("invalid local file header"));
        }
        let name_len = u64::from(u16::from_le_bytes([header[26], header[27]]));
        let extra_len = u64::from(u16::from_le_bytes([header[28], header[29]]));
        Ok(entry.header_offset + LOCAL_HEADER_SIZE as u64 + name_len + extra_len)
    }

    /// Stream an entry's decompressed content into a writer.
    ///
    /// The content CRC32 is computed on the fly and verified against the
    /// central directory record.
    ///
    /// # Errors
    /// Returns `FileError::Archive` for unsupported compression methods,
    /// truncated data, checksum mismatches, or I/O failures.
    pub fn extract_entry<W: Write>(
        &self,
        entry: &ZipEntry,
        out: &mut W,
    ) -> Result<u64, FileError> {
        let offset = self.data_offset(entry)?;
        let mut handle = &self.file;
        handle
            .seek(SeekFrom::Start(offset))
            .map_err(|e| self.archive_error(e))?;
        let source = handle.take(entry.compressed_size);

        let (written, crc) = match entry.method {
            CompressionMethod::Stored => {
                copy_and_hash(source, out).map_err(|e| self.archive_error(e))?
            }
            CompressionMethod::Deflate => {
                copy_and_hash(DeflateDecoder::new(source), out)
                    .map_err(|e| self.archive_error(e))?
            }
            CompressionMethod::Unknown(value) => {
                return Err(
                    self.invalid(&format!("unsupported compression method {value}"))
                );
            }
        };

        if written != entry.uncompressed_size {
            return Err(self.invalid(&format!("entry {} is truncated", entry.name)));
        }
        if crc != entry.crc32 {
            return Err(self.invalid(&format!("crc32 mismatch in entry {}", entry.name)));
        }
        Ok(written)
    }
}

/// Copy a stream to a writer, computing the CRC32 of the copied bytes.
fn copy_and_hash<R: Read, W: Write>(mut source: R, out: &mut W) -> io::Result<(u64, u32)> {
    let mut hasher = Crc32::new();
    let mut buffer = [0u8; 65536];
    let mut written = 0u64;
    loop {
        match source.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                hasher.update(&buffer[..n]);
                out.write_all(&buffer[..n])?;
                written += n as u64;
            }
            Err(e) => return Err(e),
        }
    }
    Ok((written, hasher.finalize()))
}
