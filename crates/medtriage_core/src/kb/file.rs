//! Fact-file persistence gateway.
//!
//! # Responsibility
//! - Read the persisted fact text from its storage location.
//! - Write replacement text so a crash mid-write can never corrupt it.
//!
//! # Invariants
//! - Writes go to a temporary sibling first and reach the real path only
//!   through a rename.
//! - A missing file is a normal condition (`Ok(None)`), not an error.

use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Result type for gateway operations.
pub type KbFileResult<T> = Result<T, KbFileError>;

/// I/O failure while reading or writing the fact file.
#[derive(Debug)]
pub enum KbFileError {
    Read { path: PathBuf, source: io::Error },
    Write { path: PathBuf, source: io::Error },
    Rename { path: PathBuf, source: io::Error },
}

impl Display for KbFileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "cannot read fact file `{}`: {source}", path.display())
            }
            Self::Write { path, source } => {
                write!(f, "cannot write fact file `{}`: {source}", path.display())
            }
            Self::Rename { path, source } => {
                write!(
                    f,
                    "cannot move fact file into place at `{}`: {source}",
                    path.display()
                )
            }
        }
    }
}

impl Error for KbFileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. }
            | Self::Write { source, .. }
            | Self::Rename { source, .. } => Some(source),
        }
    }
}

/// Storage location of the persisted fact text.
#[derive(Debug, Clone)]
pub struct KbFile {
    path: PathBuf,
}

impl KbFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the persisted text, or `None` when nothing has been persisted
    /// yet.
    pub fn read(&self) -> KbFileResult<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(KbFileError::Read {
                path: self.path.clone(),
                source: err,
            }),
        }
    }

    /// Persists `text` through a write-to-temporary-then-rename sequence.
    ///
    /// # Side effects
    /// - Creates the parent directory when missing.
    /// - Removes a stale destination before the rename, for platforms whose
    ///   rename does not overwrite.
    /// - Emits `kb_write` logging events with duration and status.
    pub fn write_atomic(&self, text: &str) -> KbFileResult<()> {
        let started_at = Instant::now();
        match self.write_atomic_inner(text) {
            Ok(()) => {
                info!(
                    "event=kb_write module=kb status=ok bytes={} duration_ms={}",
                    text.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=kb_write module=kb status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn write_atomic_inner(&self, text: &str) -> KbFileResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|err| KbFileError::Write {
                    path: self.path.clone(),
                    source: err,
                })?;
            }
        }

        let tmp_path = self.tmp_path();
        std::fs::write(&tmp_path, text).map_err(|err| KbFileError::Write {
            path: tmp_path.clone(),
            source: err,
        })?;

        let _ = std::fs::remove_file(&self.path);
        std::fs::rename(&tmp_path, &self.path).map_err(|err| KbFileError::Rename {
            path: self.path.clone(),
            source: err,
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut os_string = self.path.clone().into_os_string();
        os_string.push(".tmp");
        PathBuf::from(os_string)
    }
}

#[cfg(test)]
mod tests {
    use super::KbFile;

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().expect("temp dir");
        let file = KbFile::new(dir.path().join("kb.pl"));
        assert_eq!(file.read().expect("read should not fail"), None);
    }

    #[test]
    fn write_then_read_round_trips_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().expect("temp dir");
        let file = KbFile::new(dir.path().join("kb").join("kb.pl"));

        file.write_atomic("sintoma(fiebre).\n").expect("write");
        assert_eq!(
            file.read().expect("read").as_deref(),
            Some("sintoma(fiebre).\n")
        );
        assert!(!file.path().with_extension("pl.tmp").exists());

        file.write_atomic("sintoma(tos).\n").expect("overwrite");
        assert_eq!(file.read().expect("read").as_deref(), Some("sintoma(tos).\n"));
    }
}
