//! Knowledge-base snapshot model.
//!
//! # Responsibility
//! - Define the three entity collections (symptoms, diseases, medications)
//!   and their relations as one atomically replaceable unit.
//! - Normalize and validate snapshots before they reach persistence.
//!
//! # Invariants
//! - A validated snapshot has no dangling references: disease symptoms,
//!   medication `treats` targets and disease `contra_meds` targets all
//!   resolve to declared entities.
//! - Normalized snapshots are fully deterministic: entity collections and
//!   relation lists are deduplicated and sorted by id.

use crate::model::atom::Atom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for snapshot validation.
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Validation failure for a snapshot, naming the offending entity and
/// relation. The store guarantees no partial state survives a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    EmptySymptomId,
    EmptyDiseaseId,
    EmptyMedicationId,
    MissingDiseaseName { disease: Atom },
    MissingDiseaseTaxonomy { disease: Atom },
    UnknownSymptomRef { disease: Atom, symptom: Atom },
    UnknownDiseaseRef { medication: Atom, disease: Atom },
    UnknownMedicationRef { disease: Atom, medication: Atom },
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySymptomId => write!(f, "symptom with empty id"),
            Self::EmptyDiseaseId => write!(f, "disease with empty id"),
            Self::EmptyMedicationId => write!(f, "medication with empty id"),
            Self::MissingDiseaseName { disease } => {
                write!(f, "disease {disease}: name is required")
            }
            Self::MissingDiseaseTaxonomy { disease } => {
                write!(f, "disease {disease}: system and type are required")
            }
            Self::UnknownSymptomRef { disease, symptom } => {
                write!(f, "disease {disease}: symptom `{symptom}` does not exist")
            }
            Self::UnknownDiseaseRef { medication, disease } => {
                write!(f, "trata({medication}, {disease}): disease does not exist")
            }
            Self::UnknownMedicationRef { disease, medication } => {
                write!(
                    f,
                    "enf_contra_medicamento({disease}, {medication}): medication does not exist"
                )
            }
        }
    }
}

impl Error for SnapshotError {}

/// A symptom the knowledge base knows about. Identity is the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symptom {
    pub id: Atom,
}

impl Symptom {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self {
            id: Atom::normalize(id.as_ref()),
        }
    }
}

/// A diagnosable disease with its required symptoms and blocked medications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disease {
    pub id: Atom,
    /// Human-readable display name, reported back in triage results.
    pub name: String,
    /// Body system tag, e.g. `respiratorio`.
    pub system: Atom,
    /// Etiology tag, e.g. `viral`. Serialized as `type` to match the
    /// external schema naming.
    #[serde(rename = "type")]
    pub kind: Atom,
    #[serde(default)]
    pub description: String,
    /// Required symptom ids; the affinity denominator.
    #[serde(default)]
    pub symptoms: Vec<Atom>,
    /// Medication ids never to suggest for this disease.
    #[serde(default)]
    pub contra_meds: Vec<Atom>,
}

/// A medication, the diseases it treats and the condition tokens that
/// contraindicate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub id: Atom,
    /// Display label. UI-only: not representable in the fact text, so it
    /// does not survive persistence.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(default)]
    pub treats: Vec<Atom>,
    /// Allergy/chronic condition tokens that rule this medication out.
    #[serde(default)]
    pub contra: Vec<Atom>,
}

/// The complete knowledge base, exchanged atomically with persistence and
/// with administrative callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub symptoms: Vec<Symptom>,
    pub diseases: Vec<Disease>,
    pub medications: Vec<Medication>,
}

impl Snapshot {
    /// Built-in illustrative knowledge base used when no fact text has been
    /// persisted yet.
    pub fn bootstrap() -> Snapshot {
        Snapshot {
            symptoms: [
                "fiebre",
                "tos",
                "dolor_garganta",
                "disnea",
                "dolor_pecho",
                "cefalea",
                "nausea",
            ]
            .into_iter()
            .map(Symptom::new)
            .collect(),
            diseases: vec![Disease {
                id: Atom::normalize("gripe"),
                name: "Gripe".to_string(),
                system: Atom::normalize("respiratorio"),
                kind: Atom::normalize("viral"),
                description: "Infección respiratoria alta.".to_string(),
                symptoms: vec![
                    Atom::normalize("fiebre"),
                    Atom::normalize("tos"),
                    Atom::normalize("dolor_garganta"),
                ],
                contra_meds: Vec::new(),
            }],
            medications: vec![Medication {
                id: Atom::normalize("paracetamol"),
                label: "Paracetamol".to_string(),
                treats: vec![Atom::normalize("gripe")],
                contra: vec![Atom::normalize("alergia_paracetamol")],
            }],
        }
    }

    /// Canonicalizes every id, tag and relation list in place.
    ///
    /// # Contract
    /// - Every atom field is re-normalized.
    /// - Relation lists are deduplicated and sorted.
    /// - Entity collections are deduplicated by id (first wins) and sorted
    ///   by id.
    pub fn normalize(&mut self) {
        for symptom in &mut self.symptoms {
            symptom.id.renormalize();
        }
        for disease in &mut self.diseases {
            disease.id.renormalize();
            disease.system.renormalize();
            disease.kind.renormalize();
            normalize_relation(&mut disease.symptoms);
            normalize_relation(&mut disease.contra_meds);
        }
        for medication in &mut self.medications {
            medication.id.renormalize();
            normalize_relation(&mut medication.treats);
            normalize_relation(&mut medication.contra);
        }

        dedup_by_id(&mut self.symptoms, |s| s.id.clone());
        dedup_by_id(&mut self.diseases, |d| d.id.clone());
        dedup_by_id(&mut self.medications, |m| m.id.clone());
        self.symptoms.sort_by(|a, b| a.id.cmp(&b.id));
        self.diseases.sort_by(|a, b| a.id.cmp(&b.id));
        self.medications.sort_by(|a, b| a.id.cmp(&b.id));
    }

    /// Checks referential integrity and required fields.
    ///
    /// Call after [`Snapshot::normalize`]; lookups compare normalized atoms.
    ///
    /// # Errors
    /// Returns the first violation found, in declaration order: symptom ids,
    /// disease fields and symptom refs, medication ids, `treats` refs,
    /// `contra_meds` refs.
    pub fn validate(&self) -> SnapshotResult<()> {
        let mut symptom_ids = BTreeSet::new();
        for symptom in &self.symptoms {
            if symptom.id.as_str().is_empty() {
                return Err(SnapshotError::EmptySymptomId);
            }
            symptom_ids.insert(&symptom.id);
        }

        let mut disease_ids = BTreeSet::new();
        for disease in &self.diseases {
            if disease.id.as_str().is_empty() {
                return Err(SnapshotError::EmptyDiseaseId);
            }
            if disease.name.trim().is_empty() {
                return Err(SnapshotError::MissingDiseaseName {
                    disease: disease.id.clone(),
                });
            }
            if disease.system.as_str().is_empty() || disease.kind.as_str().is_empty() {
                return Err(SnapshotError::MissingDiseaseTaxonomy {
                    disease: disease.id.clone(),
                });
            }
            disease_ids.insert(&disease.id);
            for symptom in &disease.symptoms {
                if !symptom_ids.contains(symptom) {
                    return Err(SnapshotError::UnknownSymptomRef {
                        disease: disease.id.clone(),
                        symptom: symptom.clone(),
                    });
                }
            }
        }

        let mut medication_ids = BTreeSet::new();
        for medication in &self.medications {
            if medication.id.as_str().is_empty() {
                return Err(SnapshotError::EmptyMedicationId);
            }
            medication_ids.insert(&medication.id);
        }

        for medication in &self.medications {
            for disease in &medication.treats {
                if !disease_ids.contains(disease) {
                    return Err(SnapshotError::UnknownDiseaseRef {
                        medication: medication.id.clone(),
                        disease: disease.clone(),
                    });
                }
            }
        }
        for disease in &self.diseases {
            for medication in &disease.contra_meds {
                if !medication_ids.contains(medication) {
                    return Err(SnapshotError::UnknownMedicationRef {
                        disease: disease.id.clone(),
                        medication: medication.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Sorted symptom ids, for symptom pickers in outer layers.
    pub fn symptom_ids(&self) -> Vec<Atom> {
        self.symptoms.iter().map(|s| s.id.clone()).collect()
    }
}

fn normalize_relation(list: &mut Vec<Atom>) {
    for atom in list.iter_mut() {
        atom.renormalize();
    }
    list.sort();
    list.dedup();
}

fn dedup_by_id<T>(list: &mut Vec<T>, id_of: impl Fn(&T) -> Atom) {
    let mut seen = BTreeSet::new();
    list.retain(|item| seen.insert(id_of(item)));
}
