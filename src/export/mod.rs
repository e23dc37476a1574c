//! Snapshot export
//!
//! Refreshes the local record file from the snapshot store before a run.
//! The file is written to a temporary sibling and renamed into place, so
//! a failed export leaves the previous record file untouched.

pub mod schema;

use crate::error::{ExportError, ExportResult};
use crate::source::RECORD_FIELDS;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Writes a fresh record file at `dest`
pub trait SnapshotExporter {
    /// Export every record, returning how many were written
    fn export(&self, dest: &Path) -> ExportResult<u64>;
}

/// Exports journalists from a SQLite snapshot database
#[derive(Debug, Clone)]
pub struct SqliteExporter {
    db_path: PathBuf,
}

impl SqliteExporter {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    fn open(&self) -> ExportResult<Connection> {
        // Open read-only so a missing store is an error rather than a new empty file
        Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| ExportError::StoreOpen {
            path: self.db_path.clone(),
            source,
        })
    }

    fn write_records(&self, conn: &Connection, tmp: &Path) -> ExportResult<u64> {
        let write_err = |e: csv::Error| ExportError::Write {
            path: tmp.to_path_buf(),
            reason: e.to_string(),
        };

        let mut writer = csv::Writer::from_path(tmp).map_err(write_err)?;
        writer.write_record(RECORD_FIELDS).map_err(write_err)?;

        let mut stmt = conn.prepare(schema::SELECT_JOURNALISTS)?;
        let mut rows = stmt.query([])?;
        let mut written = 0u64;
        let mut skipped = 0u64;

        while let Some(row) = rows.next()? {
            let name = text(row.get_ref(0)?);
            let id = text(row.get_ref(1)?);
            let twitter = text(row.get_ref(2)?);
            let bio = text(row.get_ref(3)?);

            // Profiles without a handle have nothing to scrape
            if twitter.is_empty() {
                skipped += 1;
                continue;
            }

            writer
                .write_record([name, id, twitter, bio])
                .map_err(write_err)?;
            written += 1;
        }

        writer.flush().map_err(|e| ExportError::Write {
            path: tmp.to_path_buf(),
            reason: e.to_string(),
        })?;

        debug!(written, skipped, "Snapshot rows exported");
        Ok(written)
    }
}

impl SnapshotExporter for SqliteExporter {
    fn export(&self, dest: &Path) -> ExportResult<u64> {
        info!(
            store = %self.db_path.display(),
            dest = %dest.display(),
            "Exporting journalist snapshot"
        );

        let conn = self.open()?;

        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| ExportError::Write {
                    path: dest.to_path_buf(),
                    reason: e.to_string(),
                })?;
            }
        }

        let tmp = temp_path(dest);
        let written = match self.write_records(&conn, &tmp) {
            Ok(written) => written,
            Err(e) => {
                if let Err(rm) = fs::remove_file(&tmp) {
                    warn!(path = %tmp.display(), error = %rm, "Failed to remove partial export");
                }
                return Err(e);
            }
        };

        fs::rename(&tmp, dest).map_err(|e| ExportError::Write {
            path: dest.to_path_buf(),
            reason: e.to_string(),
        })?;

        info!(records = written, "Snapshot export complete");
        Ok(written)
    }
}

/// Temporary sibling of `dest` used while writing
fn temp_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    dest.with_file_name(name)
}

/// Render a column as text; NULL becomes empty
fn text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) | ValueRef::Blob(t) => String::from_utf8_lossy(t).into_owned(),
    }
}
