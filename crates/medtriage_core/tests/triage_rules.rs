use medtriage_core::{
    diagnose, Atom, Disease, Medication, PatientFacts, Snapshot, Symptom, SymptomEntry,
    TriageReport, TriageRequest,
};

fn disease(id: &str, name: &str, symptoms: &[&str]) -> Disease {
    Disease {
        id: Atom::normalize(id),
        name: name.to_string(),
        system: Atom::normalize("respiratorio"),
        kind: Atom::normalize("viral"),
        description: String::new(),
        symptoms: symptoms.iter().map(|s| Atom::normalize(s)).collect(),
        contra_meds: Vec::new(),
    }
}

fn medication(id: &str, treats: &[&str], contra: &[&str]) -> Medication {
    Medication {
        id: Atom::normalize(id),
        label: String::new(),
        treats: treats.iter().map(|s| Atom::normalize(s)).collect(),
        contra: contra.iter().map(|s| Atom::normalize(s)).collect(),
    }
}

fn knowledge_base(
    symptoms: &[&str],
    diseases: Vec<Disease>,
    medications: Vec<Medication>,
) -> Snapshot {
    let mut snapshot = Snapshot {
        symptoms: symptoms.iter().map(Symptom::new).collect(),
        diseases,
        medications,
    };
    snapshot.normalize();
    snapshot.validate().expect("test KB is valid");
    snapshot
}

fn flu_kb() -> Snapshot {
    knowledge_base(
        &["fiebre"],
        vec![disease("gripe", "Gripe", &["fiebre"])],
        vec![medication("paracetamol", &["gripe"], &[])],
    )
}

fn request(symptoms: &[(&str, &str)], allergies: &[&str], chronics: &[&str]) -> TriageRequest {
    TriageRequest {
        symptoms: symptoms
            .iter()
            .map(|(id, severity)| SymptomEntry {
                id: id.to_string(),
                severity: severity.to_string(),
                present: true,
            })
            .collect(),
        allergies: allergies.iter().map(|s| s.to_string()).collect(),
        chronics: chronics.iter().map(|s| s.to_string()).collect(),
    }
}

fn run(kb: &Snapshot, request: &TriageRequest) -> TriageReport {
    diagnose(&PatientFacts::from_request(request), kb)
}

#[test]
fn affinity_weights_severity_against_the_maximum_achievable() {
    let kb = knowledge_base(
        &["a", "b", "c"],
        vec![disease("d", "D", &["a", "b", "c"])],
        Vec::new(),
    );
    let report = run(&kb, &request(&[("a", "severo"), ("b", "moderado")], &[], &[]));
    // round(100 * (3 + 2) / (3 * 3)) = 56
    assert_eq!(report.diagnoses[0].affinity, 56);
}

#[test]
fn zero_required_symptoms_always_score_zero() {
    let kb = knowledge_base(&["a"], vec![disease("d", "D", &[])], Vec::new());
    let report = run(&kb, &request(&[("a", "severo")], &[], &[]));
    assert_eq!(report.diagnoses[0].affinity, 0);
}

#[test]
fn full_severe_match_scores_one_hundred_with_suggested_drug() {
    let report = run(&flu_kb(), &request(&[("fiebre", "severo")], &[], &[]));

    assert_eq!(report.diagnoses.len(), 1);
    let top = &report.diagnoses[0];
    assert_eq!(top.disease, "Gripe");
    assert_eq!(top.affinity, 100);
    assert_eq!(top.suggested_drug.as_deref(), Some("paracetamol"));
    assert!(top.alternatives.is_empty());
    assert_eq!(top.matched_symptoms, vec![Atom::normalize("fiebre")]);
}

#[test]
fn empty_symptom_list_is_valid_and_keeps_drug_suggestion() {
    let report = run(&flu_kb(), &request(&[], &[], &[]));

    let top = &report.diagnoses[0];
    assert_eq!(top.affinity, 0);
    // Drug suggestion is independent of affinity.
    assert_eq!(top.suggested_drug.as_deref(), Some("paracetamol"));
    assert!(top.matched_symptoms.is_empty());
}

#[test]
fn unknown_symptoms_and_severities_are_benign() {
    let report = run(
        &flu_kb(),
        &request(&[("sintoma_inventado", "gravisimo"), ("fiebre", "???")], &[], &[]),
    );
    // fiebre parses to weight 1: round(100 * 1 / 3) = 33.
    assert_eq!(report.diagnoses[0].affinity, 33);
}

#[test]
fn empty_knowledge_base_yields_empty_ranking() {
    let kb = knowledge_base(&[], Vec::new(), Vec::new());
    let report = run(&kb, &request(&[("fiebre", "severo")], &[], &[]));
    assert!(report.diagnoses.is_empty());
    assert!(!report.explanations.is_empty());
}

#[test]
fn allergy_contraindication_excludes_the_medication_entirely() {
    let kb = knowledge_base(
        &["fiebre"],
        vec![disease("gripe", "Gripe", &["fiebre"])],
        vec![medication("nuez_forte", &["gripe"], &["alergia_nueces"])],
    );
    let report = run(
        &kb,
        &request(&[("fiebre", "leve")], &["alergia_nueces"], &[]),
    );

    let top = &report.diagnoses[0];
    assert_eq!(top.suggested_drug, None);
    assert!(top.alternatives.is_empty());
}

#[test]
fn chronic_conditions_block_like_allergies() {
    let kb = knowledge_base(
        &["fiebre"],
        vec![disease("gripe", "Gripe", &["fiebre"])],
        vec![
            medication("ibuprofeno", &["gripe"], &["gastritis_cronica"]),
            medication("paracetamol", &["gripe"], &[]),
        ],
    );
    let report = run(
        &kb,
        &request(&[("fiebre", "leve")], &[], &["gastritis_cronica"]),
    );

    let top = &report.diagnoses[0];
    assert_eq!(top.suggested_drug.as_deref(), Some("paracetamol"));
    assert!(top.alternatives.is_empty());
}

#[test]
fn disease_level_blocklist_excludes_even_safe_medications() {
    let mut flagged = disease("gripe", "Gripe", &["fiebre"]);
    flagged.contra_meds = vec![Atom::normalize("paracetamol")];
    let kb = knowledge_base(
        &["fiebre"],
        vec![flagged],
        vec![medication("paracetamol", &["gripe"], &[])],
    );
    let report = run(&kb, &request(&[("fiebre", "severo")], &[], &[]));

    let top = &report.diagnoses[0];
    assert_eq!(top.suggested_drug, None);
    assert!(top.alternatives.is_empty());
}

#[test]
fn remaining_candidates_split_into_suggestion_and_alternatives_by_id() {
    let kb = knowledge_base(
        &["fiebre"],
        vec![disease("gripe", "Gripe", &["fiebre"])],
        vec![
            medication("zinc", &["gripe"], &[]),
            medication("amantadina", &["gripe"], &[]),
            medication("paracetamol", &["gripe"], &[]),
        ],
    );
    let report = run(&kb, &request(&[("fiebre", "leve")], &[], &[]));

    let top = &report.diagnoses[0];
    assert_eq!(top.suggested_drug.as_deref(), Some("amantadina"));
    assert_eq!(top.alternatives, vec!["paracetamol", "zinc"]);
}

#[test]
fn ranking_is_by_affinity_descending_with_stable_ties() {
    let kb = knowledge_base(
        &["a", "b"],
        vec![
            disease("zeta", "Zeta", &["a"]),
            disease("alfa", "Alfa", &["a"]),
            disease("beta", "Beta", &["b"]),
        ],
        Vec::new(),
    );
    let report = run(&kb, &request(&[("a", "severo"), ("b", "moderado")], &[], &[]));

    let names: Vec<&str> = report
        .diagnoses
        .iter()
        .map(|d| d.disease.as_str())
        .collect();
    // alfa and zeta tie at 100; store id order keeps alfa before zeta.
    assert_eq!(names, vec!["Alfa", "Zeta", "Beta"]);
    assert_eq!(report.diagnoses[2].affinity, 67);
}

#[test]
fn urgency_is_global_and_attached_to_every_row() {
    let kb = knowledge_base(
        &["fiebre", "disnea"],
        vec![
            disease("gripe", "Gripe", &["fiebre"]),
            disease("asma", "Asma", &["disnea"]),
        ],
        Vec::new(),
    );
    let report = run(&kb, &request(&[("disnea", "severo")], &[], &[]));

    assert_eq!(report.diagnoses.len(), 2);
    for row in &report.diagnoses {
        assert_eq!(row.urgency, "Atención inmediata");
    }
}

#[test]
fn rules_fired_labels_are_always_present() {
    let report = run(&flu_kb(), &request(&[], &[], &[]));
    assert_eq!(
        report.diagnoses[0].rules_fired,
        vec!["afinidad/3", "urgencia/1", "medicamento_seguro/2"]
    );
}

#[test]
fn diagnosis_wire_shape_omits_empty_optionals() {
    let kb = knowledge_base(&["a"], vec![disease("d", "D", &["a"])], Vec::new());
    let report = run(&kb, &request(&[], &[], &[]));
    let json = serde_json::to_value(&report).expect("report serializes");

    let row = &json["diagnoses"][0];
    assert_eq!(row["disease"], "D");
    assert_eq!(row["affinity"], 0);
    assert!(row.get("suggested_drug").is_none());
    assert!(row.get("alternatives").is_none());
    assert!(row.get("matched_symptoms").is_none());
    assert!(row.get("warnings").is_none());
    assert_eq!(row["rules_fired"][0], "afinidad/3");
    assert_eq!(row["urgency"], "Observación recomendada");
    assert!(json["explanations"].as_str().is_some());
}

#[test]
fn request_wire_shape_accepts_partial_entries() {
    let request: TriageRequest = serde_json::from_str(
        r#"{
            "symptoms": [
                {"id": "fiebre", "severity": "severo", "present": true},
                {"id": "tos"}
            ]
        }"#,
    )
    .expect("missing fields default");

    let report = diagnose(&PatientFacts::from_request(&request), &flu_kb());
    // `tos` defaults to present=false and is dropped.
    assert_eq!(report.diagnoses[0].affinity, 100);
}
