//! Fact-text codec for the knowledge base.
//!
//! # Responsibility
//! - Parse the line-oriented fact text into a [`Snapshot`].
//! - Render a snapshot back to fact text in a stable, grouped order.
//!
//! # Invariants
//! - Parsing is total: unrecognized or malformed lines are skipped, never
//!   errors, so newer fact shapes stay forward compatible.
//! - `parse_snapshot(render_snapshot(s)) == s` for any validated snapshot
//!   with empty medication labels.

use crate::model::atom::Atom;
use crate::model::snapshot::{Disease, Medication, Snapshot, Symptom};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Compiled patterns, one anchored regex per fact shape.
struct FactPatterns {
    symptom: Regex,
    disease: Regex,
    description: Regex,
    disease_symptom: Regex,
    disease_contra_med: Regex,
    medication: Regex,
    treats: Regex,
    contraindicated: Regex,
}

static PATTERNS: Lazy<FactPatterns> = Lazy::new(|| FactPatterns {
    symptom: Regex::new(r#"^sintoma\((\w+)\)\.$"#).expect("symptom pattern"),
    disease: Regex::new(r#"^enfermedad\((\w+),\s*"((?:[^"\\]|\\.)*)",\s*(\w+),\s*(\w+)\)\.$"#)
        .expect("disease pattern"),
    description: Regex::new(r#"^descripcion_enf\((\w+),\s*"((?:[^"\\]|\\.)*)"\)\.$"#)
        .expect("description pattern"),
    disease_symptom: Regex::new(r#"^enf_sintoma\((\w+),\s*(\w+)\)\.$"#)
        .expect("disease-symptom pattern"),
    disease_contra_med: Regex::new(r#"^enf_contra_medicamento\((\w+),\s*(\w+)\)\.$"#)
        .expect("disease-contra-med pattern"),
    medication: Regex::new(r#"^medicamento\((\w+)\)\.$"#).expect("medication pattern"),
    treats: Regex::new(r#"^trata\((\w+),\s*(\w+)\)\.$"#).expect("treats pattern"),
    contraindicated: Regex::new(r#"^contraindicado\((\w+),\s*(\w+)\)\.$"#)
        .expect("contraindicated pattern"),
});

/// Parses fact text into a normalized snapshot.
///
/// # Contract
/// - Blank lines and `%` comment lines are ignored.
/// - Lines matching no fact shape are counted and skipped.
/// - A disease or medication mentioned before its declaring fact is created
///   on first mention and filled in by later facts.
/// - The returned snapshot is normalized (sorted, deduplicated).
pub fn parse_snapshot(text: &str) -> Snapshot {
    let mut symptoms: BTreeMap<Atom, Symptom> = BTreeMap::new();
    let mut diseases: BTreeMap<Atom, Disease> = BTreeMap::new();
    let mut medications: BTreeMap<Atom, Medication> = BTreeMap::new();
    let mut parsed = 0usize;
    let mut skipped = 0usize;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('%') {
            continue;
        }

        let patterns = &*PATTERNS;
        if let Some(caps) = patterns.symptom.captures(line) {
            let id = Atom::normalize(&caps[1]);
            symptoms.entry(id.clone()).or_insert(Symptom { id });
        } else if let Some(caps) = patterns.disease.captures(line) {
            let disease = disease_entry(&mut diseases, &caps[1]);
            disease.name = unescape(&caps[2]);
            disease.system = Atom::normalize(&caps[3]);
            disease.kind = Atom::normalize(&caps[4]);
        } else if let Some(caps) = patterns.description.captures(line) {
            disease_entry(&mut diseases, &caps[1]).description = unescape(&caps[2]);
        } else if let Some(caps) = patterns.disease_symptom.captures(line) {
            disease_entry(&mut diseases, &caps[1])
                .symptoms
                .push(Atom::normalize(&caps[2]));
        } else if let Some(caps) = patterns.disease_contra_med.captures(line) {
            disease_entry(&mut diseases, &caps[1])
                .contra_meds
                .push(Atom::normalize(&caps[2]));
        } else if let Some(caps) = patterns.medication.captures(line) {
            let id = Atom::normalize(&caps[1]);
            medications.entry(id.clone()).or_insert_with(|| empty_medication(id));
        } else if let Some(caps) = patterns.treats.captures(line) {
            medication_entry(&mut medications, &caps[1])
                .treats
                .push(Atom::normalize(&caps[2]));
        } else if let Some(caps) = patterns.contraindicated.captures(line) {
            medication_entry(&mut medications, &caps[1])
                .contra
                .push(Atom::normalize(&caps[2]));
        } else {
            skipped += 1;
            continue;
        }
        parsed += 1;
    }

    debug!("event=kb_parse module=kb status=ok facts={parsed} skipped={skipped}");

    let mut snapshot = Snapshot {
        symptoms: symptoms.into_values().collect(),
        diseases: diseases.into_values().collect(),
        medications: medications.into_values().collect(),
    };
    snapshot.normalize();
    snapshot
}

/// Renders a snapshot as fact text in the stable grouped order: symptoms,
/// diseases, descriptions, disease-symptom links, disease-contra-medication
/// links, medications, treats links, contraindication links.
///
/// Expects a normalized snapshot; sections then come out sorted by id.
pub fn render_snapshot(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    out.push_str("% MedTriage knowledge base (generated)\n");
    out.push_str("% Edit through the snapshot API, not by hand.\n");

    out.push('\n');
    for symptom in &snapshot.symptoms {
        let _ = writeln!(out, "sintoma({}).", symptom.id);
    }

    out.push('\n');
    for disease in &snapshot.diseases {
        let _ = writeln!(
            out,
            "enfermedad({}, \"{}\", {}, {}).",
            disease.id,
            escape(&disease.name),
            disease.system,
            disease.kind
        );
    }
    for disease in &snapshot.diseases {
        let description = disease.description.trim();
        if description.is_empty() {
            continue;
        }
        let _ = writeln!(
            out,
            "descripcion_enf({}, \"{}\").",
            disease.id,
            escape(description)
        );
    }
    for disease in &snapshot.diseases {
        for symptom in &disease.symptoms {
            let _ = writeln!(out, "enf_sintoma({}, {}).", disease.id, symptom);
        }
    }
    for disease in &snapshot.diseases {
        for medication in &disease.contra_meds {
            let _ = writeln!(
                out,
                "enf_contra_medicamento({}, {}).",
                disease.id, medication
            );
        }
    }

    out.push('\n');
    for medication in &snapshot.medications {
        let _ = writeln!(out, "medicamento({}).", medication.id);
    }
    for medication in &snapshot.medications {
        for disease in &medication.treats {
            let _ = writeln!(out, "trata({}, {}).", medication.id, disease);
        }
    }
    for medication in &snapshot.medications {
        for condition in &medication.contra {
            let _ = writeln!(out, "contraindicado({}, {}).", medication.id, condition);
        }
    }

    out
}

fn disease_entry<'a>(diseases: &'a mut BTreeMap<Atom, Disease>, raw_id: &str) -> &'a mut Disease {
    let id = Atom::normalize(raw_id);
    diseases.entry(id.clone()).or_insert_with(|| Disease {
        id,
        name: String::new(),
        system: Atom::normalize(""),
        kind: Atom::normalize(""),
        description: String::new(),
        symptoms: Vec::new(),
        contra_meds: Vec::new(),
    })
}

fn medication_entry<'a>(
    medications: &'a mut BTreeMap<Atom, Medication>,
    raw_id: &str,
) -> &'a mut Medication {
    let id = Atom::normalize(raw_id);
    medications
        .entry(id.clone())
        .or_insert_with(|| empty_medication(id))
}

fn empty_medication(id: Atom) -> Medication {
    Medication {
        id,
        label: String::new(),
        treats: Vec::new(),
        contra: Vec::new(),
    }
}

fn escape(text: &str) -> String {
    text.replace('"', "\\\"")
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}
