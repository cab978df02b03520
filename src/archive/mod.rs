//! Zip archive reading and extraction.
//!
//! The module is split into three parts:
//!
//! - [`structures`]: fixed-layout zip records (end record, ZIP64 records,
//!   entry metadata)
//! - [`reader`]: seek-based parsing of an archive file
//! - [`extract`]: the extraction operations built on top
//!
//! Reading starts from the End of Central Directory record at the file tail,
//! so listing entries never touches the entry data itself. STORED and
//! DEFLATE entries are supported; encrypted and multi-disk archives are not.

mod extract;
mod reader;
mod structures;

pub use extract::{extract_files, extract_files_from_directory, list_entries};
pub use reader::ZipReader;
pub use structures::{CompressionMethod, ZipEntry};
