//! Archive header and file table.
//!
//! Layout: magic, loader version string, 20-byte hash, 256-byte signature,
//! 4-byte signed-data length, then the signed data: module name, module
//! version, u32 entry count and the entry table. Entry data follows the table
//! back to back; an entry's offset is the sum of the compressed lengths
//! before it.

use std::io::Read;

use flate2::read::DeflateDecoder;
use serde::Serialize;

use super::reader::ByteReader;
use super::ArchiveError;

pub const MAGIC: &[u8; 4] = b"TMOD";

/// Hash (20) + signature (256) + signed-data length (4).
const SIGNATURE_BLOCK_LEN: usize = 20 + 256 + 4;

/// Smallest possible entry record: empty name + two u32s.
const MIN_ENTRY_LEN: usize = 1 + 4 + 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleIdentity {
    pub name: String,
    pub version: String,
}

/// One file inside the archive. `offset` is relative to the data blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub offset: u64,
    pub uncompressed_length: u32,
    pub compressed_length: u32,
}

impl ArchiveEntry {
    pub fn is_compressed(&self) -> bool {
        self.uncompressed_length != self.compressed_length
    }
}

pub(crate) fn check_magic(reader: &mut ByteReader<'_>) -> Result<(), ArchiveError> {
    match reader.take(MAGIC.len()) {
        Ok(magic) if magic == MAGIC => Ok(()),
        _ => Err(ArchiveError::BadMagic),
    }
}

/// Skip the loader version and the signature block.
pub(crate) fn skip_preamble(reader: &mut ByteReader<'_>) -> Result<(), ArchiveError> {
    reader.read_string()?;
    reader.skip(SIGNATURE_BLOCK_LEN)
}

pub(crate) fn read_identity(reader: &mut ByteReader<'_>) -> Result<ModuleIdentity, ArchiveError> {
    let name = reader.read_string()?;
    let version = reader.read_string()?;
    Ok(ModuleIdentity { name, version })
}

/// Read `count` entries into `entries`, assigning cumulative offsets.
///
/// Entries read before a failure stay in `entries`.
pub(crate) fn read_entries(
    reader: &mut ByteReader<'_>,
    count: u32,
    entries: &mut Vec<ArchiveEntry>,
) -> Result<(), ArchiveError> {
    entries.reserve((count as usize).min(reader.remaining() / MIN_ENTRY_LEN));
    let mut offset: u64 = 0;
    for _ in 0..count {
        let name = reader.read_string()?;
        let uncompressed_length = reader.read_u32_le()?;
        let compressed_length = reader.read_u32_le()?;
        entries.push(ArchiveEntry { name, offset, uncompressed_length, compressed_length });
        offset += u64::from(compressed_length);
    }
    Ok(())
}

/// A fully decoded header and file table.
#[derive(Debug)]
pub struct ArchiveTable {
    pub identity: ModuleIdentity,
    pub entries: Vec<ArchiveEntry>,
    data_start: usize,
}

impl ArchiveTable {
    pub fn parse(data: &[u8]) -> Result<Self, ArchiveError> {
        let mut reader = ByteReader::new(data);
        check_magic(&mut reader)?;
        skip_preamble(&mut reader)?;
        let identity = read_identity(&mut reader)?;
        let count = reader.read_u32_le()?;
        let mut entries = Vec::new();
        read_entries(&mut reader, count, &mut entries)?;
        Ok(Self::from_parts(identity, entries, reader.position()))
    }

    /// Assemble a table from pieces already decoded. `data_start` is the
    /// byte position just past the entry table.
    pub(crate) fn from_parts(identity: ModuleIdentity, entries: Vec<ArchiveEntry>, data_start: usize) -> Self {
        Self { identity, entries, data_start }
    }

    pub fn entry(&self, name: &str) -> Option<&ArchiveEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// The entry's contents, inflated when stored compressed.
    pub fn entry_bytes(&self, data: &[u8], entry: &ArchiveEntry) -> Result<Vec<u8>, ArchiveError> {
        let out_of_bounds = || ArchiveError::EntryOutOfBounds { name: entry.name.clone() };

        let start = usize::try_from(entry.offset)
            .ok()
            .and_then(|offset| self.data_start.checked_add(offset))
            .ok_or_else(out_of_bounds)?;
        let end = start
            .checked_add(entry.compressed_length as usize)
            .ok_or_else(out_of_bounds)?;
        let raw = data.get(start..end).ok_or_else(out_of_bounds)?;

        if !entry.is_compressed() {
            return Ok(raw.to_vec());
        }

        let mut inflated = Vec::with_capacity(entry.uncompressed_length as usize);
        DeflateDecoder::new(raw)
            .take(u64::from(entry.uncompressed_length))
            .read_to_end(&mut inflated)
            .map_err(|source| ArchiveError::Inflate { name: entry.name.clone(), source })?;
        Ok(inflated)
    }
}
