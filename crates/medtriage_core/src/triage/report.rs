//! Triage request and report wire types.
//!
//! # Responsibility
//! - Define the JSON shapes exchanged with the surrounding request layer.
//!
//! # Invariants
//! - Field names are wire-stable; optional fields are omitted when empty.
//! - `rules_fired` is always present, even when a step found nothing.

use crate::model::atom::Atom;
use serde::{Deserialize, Serialize};

/// One reported symptom from the patient form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomEntry {
    pub id: String,
    /// `leve`/`moderado`/`severo`, or `1`..`3`. Unknown values weigh 1.
    #[serde(default)]
    pub severity: String,
    /// Only entries with `present == true` are asserted.
    #[serde(default)]
    pub present: bool,
}

/// The patient-asserted facts of one triage request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageRequest {
    #[serde(default)]
    pub symptoms: Vec<SymptomEntry>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub chronics: Vec<String>,
}

/// One ranked diagnosis row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnosis {
    /// Display name of the disease.
    pub disease: String,
    /// 0-100 severity-weighted symptom coverage.
    pub affinity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_drug: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<String>,
    /// Global per-request urgency, repeated on every row.
    pub urgency: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Fixed labels for the logical steps that ran; documentation metadata,
    /// not a derived trace.
    pub rules_fired: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched_symptoms: Vec<Atom>,
}

/// Ranked diagnoses plus a fixed explanation of the evaluation steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageReport {
    pub diagnoses: Vec<Diagnosis>,
    pub explanations: String,
}
