//! Triage use-case service.
//!
//! # Responsibility
//! - Provide the stable entry points the surrounding request layer calls.
//! - Delegate storage to the fact store and scoring to the session module.
//!
//! # Invariants
//! - Service APIs never bypass store validation/persistence contracts.
//! - Diagnosis runs against one consistent snapshot per request.

use crate::kb::store::{FactStore, StoreResult};
use crate::model::atom::Atom;
use crate::model::snapshot::Snapshot;
use crate::triage::report::{TriageReport, TriageRequest};
use crate::triage::session::{diagnose, PatientFacts};
use log::{info, warn};
use std::sync::Arc;
use std::time::Instant;

/// Use-case façade over the shared fact store.
pub struct TriageService {
    store: Arc<FactStore>,
}

impl TriageService {
    /// Creates a service sharing the given store.
    pub fn new(store: Arc<FactStore>) -> Self {
        Self { store }
    }

    /// Runs one diagnostic session against the live knowledge base.
    ///
    /// # Contract
    /// - The request is normalized, never rejected; see the session module
    ///   for the benign-input rules.
    /// - The snapshot in use stays consistent for the whole pass even if an
    ///   administrative replace lands concurrently.
    pub fn diagnose(&self, request: &TriageRequest) -> TriageReport {
        let started_at = Instant::now();
        let snapshot = self.store.current();
        let facts = PatientFacts::from_request(request);
        let report = diagnose(&facts, &snapshot);
        info!(
            "event=diagnose module=triage status=ok diseases={} ranked={} duration_ms={}",
            snapshot.diseases.len(),
            report.diagnoses.len(),
            started_at.elapsed().as_millis()
        );
        report
    }

    /// Returns a copy of the live snapshot, for administrative reads.
    pub fn snapshot(&self) -> Snapshot {
        self.store.current().as_ref().clone()
    }

    /// Replaces the knowledge base with a validated snapshot.
    ///
    /// # Errors
    /// Validation and persistence failures pass through unchanged; the
    /// previous knowledge base stays active on any error.
    pub fn replace_snapshot(&self, snapshot: Snapshot) -> StoreResult<()> {
        match self.store.replace(snapshot) {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!("event=kb_replace module=triage status=error error={err}");
                Err(err)
            }
        }
    }

    /// Renders the live knowledge base as raw fact text.
    pub fn export_text(&self) -> String {
        self.store.export_text()
    }

    /// Imports raw fact text without validation.
    pub fn import_text(&self, text: &str) -> StoreResult<()> {
        self.store.import_text(text)
    }

    /// Sorted symptom ids for the public symptom picker.
    pub fn symptom_ids(&self) -> Vec<Atom> {
        self.store.symptom_ids()
    }
}
