//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `medtriage_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use medtriage_core::Snapshot;

fn main() {
    let kb = Snapshot::bootstrap();
    println!("medtriage_core version={}", medtriage_core::core_version());
    println!(
        "medtriage_core bootstrap symptoms={} diseases={} medications={}",
        kb.symptoms.len(),
        kb.diseases.len(),
        kb.medications.len()
    );
}
