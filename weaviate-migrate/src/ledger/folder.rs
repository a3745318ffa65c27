//! Numbered migration files in a folder.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use super::record::MigrationRecord;
use crate::errors::{MigrateError, MigrateResult};

static MIGRATION_FILE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)_migration\.json$").expect("migration filename pattern should compile"));

/// File name for a sequence number, e.g. `0007_migration.json`.
pub fn migration_filename(sequence: u32) -> String {
    format!("{sequence:04}_migration.json")
}

/// Sequence number encoded in a ledger file name, if it is one.
pub fn parse_sequence(file_name: &str) -> Option<u32> {
    MIGRATION_FILE_PATTERN
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// A discovered ledger file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub sequence: u32,
    pub file_name: String,
    pub path: PathBuf,
}

/// The ordered set of migration files in one folder.
///
/// There is no locking: two processes writing to the same folder can compute
/// the same next number. Files are created with create-new semantics, so the
/// loser of such a race gets an error instead of overwriting the winner.
#[derive(Debug, Clone)]
pub struct MigrationLedger {
    folder: PathBuf,
}

impl MigrationLedger {
    /// Open an existing migration folder.
    pub fn open(folder: impl Into<PathBuf>) -> MigrateResult<Self> {
        let folder = folder.into();
        if !folder.is_dir() {
            return Err(MigrateError::configuration(format!(
                "migration folder {} does not exist",
                folder.display()
            )));
        }
        Ok(Self { folder })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// All ledger files, in sequence order.
    ///
    /// Files that do not match `NNNN_migration.json` are ignored. For
    /// zero-padded names sequence order is the same as lexicographic order.
    pub fn entries(&self) -> MigrateResult<Vec<LedgerEntry>> {
        let read_dir = std::fs::read_dir(&self.folder).map_err(|source| MigrateError::Io {
            path: self.folder.clone(),
            source,
        })?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|source| MigrateError::Io {
                path: self.folder.clone(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            match parse_sequence(file_name) {
                Some(sequence) => entries.push(LedgerEntry {
                    sequence,
                    file_name: file_name.to_string(),
                    path: path.clone(),
                }),
                None if MIGRATION_FILE_PATTERN.is_match(file_name) => {
                    warn!("ignoring {file_name}: sequence number out of range");
                }
                None => debug!("ignoring non-ledger file {file_name}"),
            }
        }

        entries.sort_by(|a, b| a.sequence.cmp(&b.sequence).then_with(|| a.file_name.cmp(&b.file_name)));
        Ok(entries)
    }

    /// Paths of all ledger files, in sequence order.
    pub fn list_in_order(&self) -> MigrateResult<Vec<PathBuf>> {
        Ok(self.entries()?.into_iter().map(|e| e.path).collect())
    }

    /// One past the last sequence number, or 1 for an empty folder.
    pub fn next_sequence_number(&self) -> MigrateResult<u32> {
        Ok(self.entries()?.last().map_or(1, |last| last.sequence.saturating_add(1)))
    }

    /// Persist a record as the next ledger entry.
    pub fn write(&self, record: &MigrationRecord) -> MigrateResult<LedgerEntry> {
        let sequence = self.next_sequence_number()?;
        let file_name = migration_filename(sequence);
        let path = self.folder.join(&file_name);

        let io_err = |source: std::io::Error| MigrateError::Io {
            path: path.clone(),
            source,
        };

        let mut json = serde_json::to_string_pretty(record).map_err(|err| io_err(err.into()))?;
        json.push('\n');

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(io_err)?;
        file.write_all(json.as_bytes()).map_err(io_err)?;

        info!("wrote {} migration {}", record.kind(), path.display());

        Ok(LedgerEntry {
            sequence,
            file_name,
            path,
        })
    }

    /// Load one ledger file.
    pub fn read(path: &Path) -> MigrateResult<MigrationRecord> {
        let content = std::fs::read_to_string(path)
            .map_err(|err| MigrateError::migration_load(path, format!("could not read file: {err}")))?;

        serde_json::from_str(&content).map_err(|err| MigrateError::migration_load(path, err.to_string()))
    }
}
