//! Process-wide fact store.
//!
//! # Responsibility
//! - Own the live knowledge-base snapshot shared by concurrent triage
//!   sessions.
//! - Gate every mutation through normalize → validate → persist → swap.
//!
//! # Invariants
//! - Readers receive a complete `Arc<Snapshot>` and keep it for the whole
//!   session even if a replace lands concurrently.
//! - A validation or persistence failure leaves both the in-memory snapshot
//!   and the persisted file untouched.

use crate::kb::facts::{parse_snapshot, render_snapshot};
use crate::kb::file::{KbFile, KbFileError};
use crate::model::atom::Atom;
use crate::model::snapshot::{Snapshot, SnapshotError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failure surfaced by [`FactStore`] mutations.
#[derive(Debug)]
pub enum StoreError {
    /// The snapshot violates referential integrity or required fields.
    Validation(SnapshotError),
    /// The fact file could not be read or atomically written.
    Persistence(KbFileError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "snapshot validation error: {err}"),
            Self::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persistence(err) => Some(err),
        }
    }
}

impl From<SnapshotError> for StoreError {
    fn from(value: SnapshotError) -> Self {
        Self::Validation(value)
    }
}

impl From<KbFileError> for StoreError {
    fn from(value: KbFileError) -> Self {
        Self::Persistence(value)
    }
}

/// Shared knowledge-base store: an atomically swappable immutable snapshot
/// behind a reader/writer lock, backed by the fact file.
pub struct FactStore {
    file: KbFile,
    current: RwLock<Arc<Snapshot>>,
}

impl FactStore {
    /// Opens the store from the persisted fact text.
    ///
    /// # Contract
    /// - A missing file yields the built-in bootstrap snapshot; it is not
    ///   written back until the first replace.
    /// - An existing file is parsed leniently: unrecognized lines are
    ///   skipped, dangling references survive until the next validated
    ///   replace.
    ///
    /// # Errors
    /// Only an I/O failure other than file-not-found fails the open.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<FactStore> {
        let file = KbFile::new(path);
        let snapshot = match file.read()? {
            Some(text) => parse_snapshot(&text),
            None => {
                let mut bootstrap = Snapshot::bootstrap();
                bootstrap.normalize();
                bootstrap
            }
        };
        info!(
            "event=kb_open module=kb status=ok path={} symptoms={} diseases={} medications={}",
            file.path().display(),
            snapshot.symptoms.len(),
            snapshot.diseases.len(),
            snapshot.medications.len()
        );
        Ok(FactStore {
            file,
            current: RwLock::new(Arc::new(snapshot)),
        })
    }

    /// Returns the live snapshot.
    ///
    /// Cheap pointer clone; the caller holds one consistent snapshot for as
    /// long as it keeps the `Arc`, independent of concurrent replaces.
    pub fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&self.read_guard())
    }

    /// Replaces the whole knowledge base, all-or-nothing.
    ///
    /// # Contract
    /// - The snapshot is normalized, validated, rendered and persisted
    ///   atomically before the in-memory snapshot is swapped.
    /// - On any error the previously active snapshot stays fully intact.
    pub fn replace(&self, snapshot: Snapshot) -> StoreResult<()> {
        let started_at = Instant::now();
        let mut snapshot = snapshot;
        snapshot.normalize();
        snapshot.validate()?;
        let text = render_snapshot(&snapshot);

        let mut guard = self.write_guard();
        self.file.write_atomic(&text)?;
        *guard = Arc::new(snapshot);

        info!(
            "event=kb_replace module=kb status=ok symptoms={} diseases={} medications={} duration_ms={}",
            guard.symptoms.len(),
            guard.diseases.len(),
            guard.medications.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Renders the live snapshot as fact text, for raw export.
    pub fn export_text(&self) -> String {
        render_snapshot(&self.current())
    }

    /// Raw import: persists `text` verbatim and swaps in its lenient parse.
    ///
    /// No validation runs; this mirrors the validated [`FactStore::replace`]
    /// the way a raw file upload mirrors the admin snapshot form.
    pub fn import_text(&self, text: &str) -> StoreResult<()> {
        let snapshot = parse_snapshot(text);
        let mut guard = self.write_guard();
        self.file.write_atomic(text)?;
        *guard = Arc::new(snapshot);
        info!(
            "event=kb_import module=kb status=ok bytes={} diseases={}",
            text.len(),
            guard.diseases.len()
        );
        Ok(())
    }

    /// Sorted symptom ids of the live snapshot.
    pub fn symptom_ids(&self) -> Vec<Atom> {
        self.current().symptom_ids()
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, Arc<Snapshot>> {
        // A poisoned lock only means a panic elsewhere while holding it;
        // the snapshot itself is immutable, so recovering it is safe.
        self.current.read().unwrap_or_else(|err| err.into_inner())
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, Arc<Snapshot>> {
        self.current.write().unwrap_or_else(|err| err.into_inner())
    }
}
