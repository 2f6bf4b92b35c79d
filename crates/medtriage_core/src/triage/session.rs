//! Diagnostic session: one scoring pass over the knowledge base.
//!
//! # Responsibility
//! - Turn patient-asserted facts plus the stored relations into ranked,
//!   explainable diagnoses.
//!
//! # Invariants
//! - A session never mutates the knowledge base; it is a pure, bounded
//!   computation over one snapshot.
//! - Urgency is computed once per request and attached verbatim to every
//!   ranked row.
//! - Malformed patient input is normalized, never rejected.

use crate::model::atom::Atom;
use crate::model::snapshot::{Disease, Snapshot};
use crate::triage::report::{Diagnosis, TriageReport, TriageRequest};
use std::collections::{BTreeMap, BTreeSet};

/// Symptoms that escalate urgency regardless of which disease they back.
/// Rule data, not knowledge-base data.
const CRITICAL_SYMPTOMS: [&str; 2] = ["disnea", "dolor_pecho"];

/// Best affinity at or above this escalates to a recommended consult.
const CONSULT_AFFINITY_THRESHOLD: i64 = 70;

/// Fixed labels for the logical steps every session executes.
const RULES_FIRED: [&str; 3] = ["afinidad/3", "urgencia/1", "medicamento_seguro/2"];

const EXPLANATIONS: &str =
    "Evaluación basada en reglas: afinidad/3, urgencia/1 y medicamento_seguro/2.";

/// Reported symptom severity. Weights feed the affinity numerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Leve,
    Moderado,
    Severo,
}

impl Severity {
    /// Parses a severity string. Total: accepts `1`..`3` and the named
    /// levels; anything else is `Leve`.
    pub fn parse(raw: &str) -> Severity {
        match raw.trim().to_lowercase().as_str() {
            "3" | "severo" => Severity::Severo,
            "2" | "moderado" => Severity::Moderado,
            _ => Severity::Leve,
        }
    }

    pub fn weight(self) -> u32 {
        match self {
            Severity::Leve => 1,
            Severity::Moderado => 2,
            Severity::Severo => 3,
        }
    }
}

/// Coarse triage level for the whole request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Observation,
    Consult,
    Immediate,
}

impl Urgency {
    pub fn label(self) -> &'static str {
        match self {
            Urgency::Observation => "Observación recomendada",
            Urgency::Consult => "Consulta médica recomendada",
            Urgency::Immediate => "Atención inmediata",
        }
    }
}

/// Normalized patient-asserted facts for one session.
#[derive(Debug, Clone, Default)]
pub struct PatientFacts {
    /// Present symptoms with their weight; first assertion of an id wins.
    present: BTreeMap<Atom, Severity>,
    blocked_conditions: BTreeSet<Atom>,
}

impl PatientFacts {
    /// Builds facts from the raw request: absent entries are dropped, ids
    /// and condition tokens are normalized, severities parsed leniently.
    pub fn from_request(request: &TriageRequest) -> PatientFacts {
        let mut present = BTreeMap::new();
        for entry in &request.symptoms {
            if !entry.present {
                continue;
            }
            let id = Atom::normalize(&entry.id);
            present
                .entry(id)
                .or_insert_with(|| Severity::parse(&entry.severity));
        }

        let mut blocked_conditions = BTreeSet::new();
        for allergy in &request.allergies {
            blocked_conditions.insert(Atom::normalize(allergy));
        }
        for chronic in &request.chronics {
            blocked_conditions.insert(Atom::normalize(chronic));
        }

        PatientFacts {
            present,
            blocked_conditions,
        }
    }

    fn severity_of(&self, symptom: &Atom) -> Option<Severity> {
        self.present.get(symptom).copied()
    }
}

/// Runs one diagnostic session over `kb` and returns the ranked report.
///
/// # Contract
/// - Diseases are ranked by affinity descending; ties keep the store's
///   stable id order.
/// - An empty symptom list yields affinity 0 everywhere; an empty disease
///   collection yields an empty ranking.
pub fn diagnose(facts: &PatientFacts, kb: &Snapshot) -> TriageReport {
    let mut rows: Vec<DiagnosisRow<'_>> = kb
        .diseases
        .iter()
        .map(|disease| score_disease(facts, disease))
        .collect();

    let urgency = assess_urgency(facts, &rows);
    rows.sort_by(|a, b| b.affinity.cmp(&a.affinity));

    let diagnoses = rows
        .into_iter()
        .map(|row| {
            let mut safe_meds = safe_medications(facts, kb, row.disease);
            let suggested_drug = if safe_meds.is_empty() {
                None
            } else {
                Some(safe_meds.remove(0))
            };
            Diagnosis {
                disease: row.disease.name.clone(),
                affinity: row.affinity,
                suggested_drug,
                alternatives: safe_meds,
                urgency: urgency.label().to_string(),
                warnings: Vec::new(),
                rules_fired: RULES_FIRED.iter().map(|s| s.to_string()).collect(),
                matched_symptoms: row.matched,
            }
        })
        .collect();

    TriageReport {
        diagnoses,
        explanations: EXPLANATIONS.to_string(),
    }
}

struct DiagnosisRow<'kb> {
    disease: &'kb Disease,
    affinity: i64,
    matched: Vec<Atom>,
}

/// Affinity: each required symptom contributes up to 3 points (maximum
/// severity); the score is the rounded percentage of the maximum
/// achievable. Zero required symptoms score 0.
fn score_disease<'kb>(facts: &PatientFacts, disease: &'kb Disease) -> DiagnosisRow<'kb> {
    let mut matched = Vec::new();
    let mut points = 0u32;
    for symptom in &disease.symptoms {
        if let Some(severity) = facts.severity_of(symptom) {
            points += severity.weight();
            matched.push(symptom.clone());
        }
    }

    let affinity = if disease.symptoms.is_empty() {
        0
    } else {
        let max_points = 3 * disease.symptoms.len() as u32;
        (f64::from(points) * 100.0 / f64::from(max_points)).round() as i64
    };

    DiagnosisRow {
        disease,
        affinity,
        matched,
    }
}

/// Global urgency: immediate when a critical symptom is at least moderate,
/// a consult when the best affinity crosses the threshold or a critical
/// symptom is present at all, observation otherwise.
fn assess_urgency(facts: &PatientFacts, rows: &[DiagnosisRow<'_>]) -> Urgency {
    let critical_severity = CRITICAL_SYMPTOMS
        .iter()
        .filter_map(|id| facts.severity_of(&Atom::normalize(id)))
        .max();

    if critical_severity.is_some_and(|s| s >= Severity::Moderado) {
        return Urgency::Immediate;
    }

    let best_affinity = rows.iter().map(|row| row.affinity).max().unwrap_or(0);
    if best_affinity >= CONSULT_AFFINITY_THRESHOLD || critical_severity.is_some() {
        return Urgency::Consult;
    }

    Urgency::Observation
}

/// Medications treating `disease` that are not ruled out by the patient's
/// allergies/chronic conditions or by the disease's own blocklist, in the
/// store's stable id order.
fn safe_medications(facts: &PatientFacts, kb: &Snapshot, disease: &Disease) -> Vec<String> {
    kb.medications
        .iter()
        .filter(|med| med.treats.contains(&disease.id))
        .filter(|med| {
            !med.contra
                .iter()
                .any(|condition| facts.blocked_conditions.contains(condition))
        })
        .filter(|med| !disease.contra_meds.contains(&med.id))
        .map(|med| med.id.to_string())
        .collect()
}
