//! Record file format.
//!
//! Each shard of an output is one record file. Records are the element
//! descriptor's encoded bytes; the header records which type family wrote
//! them so a reader with a different family fails fast instead of decoding
//! garbage.
//!
//! # File Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ Magic "STRD" (4) │ Version (4) │ Family len (2) │ Family │
//! ├──────────────────────────────────────────────────────────┤
//! │ Record 1                                                 │
//! ├──────────────────────────────────────────────────────────┤
//! │ ...                                                      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Record Layout
//!
//! ```text
//! ┌─────────────────┬─────────────────────┬──────────┐
//! │ Length (4 bytes)│ Payload (variable)  │ CRC32 (4)│
//! └─────────────────┴─────────────────────┴──────────┘
//! ```
//!
//! All integers are little-endian. The CRC covers the payload only.

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use crc32fast::Hasher;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use strand_core::{Error, Result, TypeDescriptor};

/// Magic bytes identifying a record file: "STRD"
pub const RECORD_FILE_MAGIC: [u8; 4] = *b"STRD";

/// Current record file format version
pub const RECORD_FILE_VERSION: u32 = 1;

/// Suffix of in-progress files; never matched by a naming scheme.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Record file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFileHeader {
    /// Format version for forward compatibility
    pub format_version: u32,
    /// Identifier of the type family that encoded the records
    pub family: String,
}

impl RecordFileHeader {
    /// Header for records of `family`.
    pub fn new(family: &str) -> Self {
        RecordFileHeader {
            format_version: RECORD_FILE_VERSION,
            family: family.to_string(),
        }
    }

    /// Serialize header to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let family_len = u16::try_from(self.family.len())
            .map_err(|_| Error::invalid_type(format!("family id too long: {}", self.family)))?;
        let mut buf = Vec::with_capacity(10 + self.family.len());
        buf.extend_from_slice(&RECORD_FILE_MAGIC);
        buf.extend_from_slice(&self.format_version.to_le_bytes());
        buf.extend_from_slice(&family_len.to_le_bytes());
        buf.extend_from_slice(self.family.as_bytes());
        Ok(buf)
    }

    /// Parse a header; returns it with the number of bytes consumed.
    pub fn parse(bytes: &[u8]) -> Result<(Self, usize)> {
        if bytes.len() < 10 {
            return Err(Error::corruption("record file shorter than its header"));
        }
        if bytes[0..4] != RECORD_FILE_MAGIC {
            return Err(Error::corruption("record file has invalid magic bytes"));
        }
        let format_version = LittleEndian::read_u32(&bytes[4..8]);
        if format_version != RECORD_FILE_VERSION {
            return Err(Error::corruption(format!(
                "unsupported record file version {}",
                format_version
            )));
        }
        let family_len = LittleEndian::read_u16(&bytes[8..10]) as usize;
        let end = 10 + family_len;
        if bytes.len() < end {
            return Err(Error::corruption("record file header truncated"));
        }
        let family = std::str::from_utf8(&bytes[10..end])
            .map_err(|_| Error::corruption("record file family id is not UTF-8"))?
            .to_string();
        Ok((
            RecordFileHeader {
                format_version,
                family,
            },
            end,
        ))
    }
}

fn crc(payload: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(payload);
    hasher.finalize()
}

/// Write `records` to `path` using write-fsync-rename.
///
/// Returns the number of bytes written.
pub fn write_record_file<T: 'static>(path: &Path, ptype: &TypeDescriptor<T>, records: &[T]) -> Result<u64> {
    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(TEMP_SUFFIX);
    let temp_path = Path::new(&temp_name);

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(temp_path)?;
    let mut writer = BufWriter::new(file);

    let header = RecordFileHeader::new(ptype.family()).to_bytes()?;
    writer.write_all(&header)?;
    let mut written = header.len() as u64;

    for record in records {
        let payload = ptype.encode(record)?;
        let len = u32::try_from(payload.len()).map_err(|_| {
            Error::Serialization(format!("record of {} bytes exceeds u32 framing", payload.len()))
        })?;
        writer.write_u32::<LittleEndian>(len)?;
        writer.write_all(&payload)?;
        writer.write_u32::<LittleEndian>(crc(&payload))?;
        written += 8 + payload.len() as u64;
    }

    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    drop(file);

    fs::rename(temp_path, path)?;

    // Sync parent directory
    if let Some(parent) = path.parent() {
        if parent.exists() {
            File::open(parent)?.sync_all()?;
        }
    }

    Ok(written)
}

/// Read every record of the file at `path`.
///
/// # Errors
///
/// - `Corruption` if the header or any record is damaged
/// - `InvalidType` if the file was written by another type family
pub fn read_record_file<T: 'static>(path: &Path, ptype: &TypeDescriptor<T>) -> Result<Vec<T>> {
    let bytes = fs::read(path)?;
    let (header, mut offset) = RecordFileHeader::parse(&bytes)?;
    if header.family != ptype.family() {
        return Err(Error::invalid_type(format!(
            "{} was written by family {}, reader expects {}",
            path.display(),
            header.family,
            ptype.family()
        )));
    }

    let mut records = Vec::new();
    while offset < bytes.len() {
        if bytes.len() - offset < 4 {
            return Err(Error::corruption(format!(
                "{}: truncated record length at offset {}",
                path.display(),
                offset
            )));
        }
        let len = LittleEndian::read_u32(&bytes[offset..offset + 4]) as usize;
        let payload_start = offset + 4;
        let crc_start = payload_start + len;
        if bytes.len() < crc_start + 4 {
            return Err(Error::corruption(format!(
                "{}: truncated record at offset {}",
                path.display(),
                offset
            )));
        }
        let payload = &bytes[payload_start..crc_start];
        let stored_crc = LittleEndian::read_u32(&bytes[crc_start..crc_start + 4]);
        if stored_crc != crc(payload) {
            return Err(Error::corruption(format!(
                "{}: CRC mismatch for record at offset {}",
                path.display(),
                offset
            )));
        }
        records.push(ptype.decode(payload)?);
        offset = crc_start + 4;
    }
    Ok(records)
}
