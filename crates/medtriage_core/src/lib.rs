//! Core domain logic for MedTriage.
//! This crate is the single source of truth for triage business invariants.

pub mod kb;
pub mod logging;
pub mod model;
pub mod service;
pub mod triage;

pub use kb::facts::{parse_snapshot, render_snapshot};
pub use kb::file::{KbFile, KbFileError, KbFileResult};
pub use kb::store::{FactStore, StoreError, StoreResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::atom::Atom;
pub use model::snapshot::{
    Disease, Medication, Snapshot, SnapshotError, SnapshotResult, Symptom,
};
pub use service::triage_service::TriageService;
pub use triage::report::{Diagnosis, SymptomEntry, TriageReport, TriageRequest};
pub use triage::session::{diagnose, PatientFacts, Severity, Urgency};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
