//! Archive module — dependency extraction from packaged server modules.
//!
//! Archives come from a third-party packager, so parsing is best effort:
//! [`parse_dependencies`] turns every structural failure into "no
//! dependencies", and [`debug_parse`] reports how far decoding got.

pub mod info;
pub mod reader;
pub mod route;
pub mod table;

use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use info::{parse_build_txt, parse_info, ModuleDependencies};
use reader::ByteReader;
use table::{check_magic, read_entries, read_identity, skip_preamble, ArchiveEntry, ArchiveTable};

pub use table::ModuleIdentity;

const INFO_ENTRY: &str = "Info";
const BUILD_TXT_ENTRY: &str = "build.txt";

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Not a module archive (bad magic)")]
    BadMagic,
    #[error("Unexpected end of data at byte {offset} (needed {wanted} more)")]
    UnexpectedEof { offset: usize, wanted: usize },
    #[error("Malformed length prefix at byte {offset}")]
    VarintOverflow { offset: usize },
    #[error("Entry {name} lies outside the archive")]
    EntryOutOfBounds { name: String },
    #[error("Failed to inflate {name}: {source}")]
    Inflate {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Hard dependencies of the module in `data`, or empty if it cannot be read.
pub fn parse_dependencies(data: &[u8]) -> Vec<String> {
    match read_dependencies(data) {
        Ok(deps) => deps.hard,
        Err(e) => {
            debug!("Archive dependency parse failed: {}", e);
            Vec::new()
        }
    }
}

/// [`parse_dependencies`] for a file on disk. Unreadable files yield no dependencies.
pub fn parse_dependencies_file(path: &Path) -> Vec<String> {
    match std::fs::read(path) {
        Ok(data) => parse_dependencies(&data),
        Err(e) => {
            warn!("Cannot read archive {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Module name and version from the archive header.
pub fn read_module_identity(data: &[u8]) -> Result<ModuleIdentity, ArchiveError> {
    let mut reader = ByteReader::new(data);
    check_magic(&mut reader)?;
    skip_preamble(&mut reader)?;
    read_identity(&mut reader)
}

fn read_dependencies(data: &[u8]) -> Result<ModuleDependencies, ArchiveError> {
    let table = ArchiveTable::parse(data)?;
    dependencies_from_table(&table, data)
}

/// `Info` wins when present; otherwise the first `modReferences` line of
/// `build.txt` supplies the hard dependencies.
fn dependencies_from_table(table: &ArchiveTable, data: &[u8]) -> Result<ModuleDependencies, ArchiveError> {
    if let Some(entry) = table.entry(INFO_ENTRY) {
        return parse_info(&table.entry_bytes(data, entry)?);
    }
    if let Some(entry) = table.entry(BUILD_TXT_ENTRY) {
        let hard = parse_build_txt(&table.entry_bytes(data, entry)?);
        return Ok(ModuleDependencies { hard, optional: Vec::new() });
    }
    Ok(ModuleDependencies::default())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub name: String,
    pub uncompressed: u32,
    pub compressed: u32,
}

impl From<&ArchiveEntry> for FileRecord {
    fn from(entry: &ArchiveEntry) -> Self {
        Self {
            name: entry.name.clone(),
            uncompressed: entry.uncompressed_length,
            compressed: entry.compressed_length,
        }
    }
}

/// Diagnostic view of an archive. Fields are filled as far as decoding got.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArchiveReport {
    pub magic_ok: bool,
    pub module_name: String,
    pub file_count: u32,
    pub files: Vec<FileRecord>,
    pub hard_dependencies: Vec<String>,
    pub optional_dependencies: Vec<String>,
    pub parse_ok: bool,
    pub parse_error: Option<String>,
}

pub fn debug_parse(data: &[u8]) -> ArchiveReport {
    let mut report = ArchiveReport::default();
    if let Err(e) = fill_report(data, &mut report) {
        report.parse_error = Some(e.to_string());
    }
    report
}

fn fill_report(data: &[u8], report: &mut ArchiveReport) -> Result<(), ArchiveError> {
    let mut reader = ByteReader::new(data);
    check_magic(&mut reader)?;
    report.magic_ok = true;

    skip_preamble(&mut reader)?;
    let identity = read_identity(&mut reader)?;
    report.module_name = identity.name.clone();
    report.file_count = reader.read_u32_le()?;

    let mut entries = Vec::new();
    let read = read_entries(&mut reader, report.file_count, &mut entries);
    report.files = entries.iter().map(FileRecord::from).collect();
    read?;

    let table = ArchiveTable::from_parts(identity, entries, reader.position());
    let deps = dependencies_from_table(&table, data)?;
    report.hard_dependencies = deps.hard;
    report.optional_dependencies = deps.optional;
    report.parse_ok = true;
    Ok(())
}
