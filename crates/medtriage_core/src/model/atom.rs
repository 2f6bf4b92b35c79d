//! Atom identifier model.
//!
//! # Responsibility
//! - Define the canonical normalized identifier used for every entity id,
//!   taxonomy tag and condition token in the knowledge base.
//! - Provide the single normalization routine shared by the KB write path
//!   and the patient-fact read path.
//!
//! # Invariants
//! - An `Atom` only ever holds text matching `[a-z][a-z0-9_]*`.
//! - Normalization is total: every input string maps to a valid atom.
//! - Two inputs that normalize identically denote the same entity.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Normalized identifier for symptoms, diseases, medications, taxonomy tags
/// and allergy/chronic condition tokens.
///
/// Construct via [`Atom::normalize`]; deserialized values are re-normalized
/// before use by the snapshot layer, so an `Atom` in a validated snapshot is
/// always canonical.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Atom(String);

impl Atom {
    /// Canonicalizes free-form text into the restricted atom alphabet.
    ///
    /// # Contract
    /// - Lowercases and trims the input.
    /// - Maps spaces and hyphens to `_`.
    /// - Strips every remaining character outside `[a-z0-9_]`.
    /// - An empty result becomes `x`; a result not starting with a letter
    ///   is prefixed with `x_`.
    /// - Never fails.
    pub fn normalize(raw: &str) -> Atom {
        let mut out = String::with_capacity(raw.len());
        for ch in raw.trim().to_lowercase().chars() {
            match ch {
                ' ' | '-' => out.push('_'),
                'a'..='z' | '0'..='9' | '_' => out.push(ch),
                _ => {}
            }
        }
        if out.is_empty() {
            out.push('x');
        }
        if !out.chars().next().is_some_and(|c| c.is_ascii_lowercase()) {
            out.insert_str(0, "x_");
        }
        Atom(out)
    }

    /// Returns the atom text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Re-normalizes this atom in place.
    ///
    /// Used by snapshot normalization on deserialized values, where the
    /// string may have bypassed [`Atom::normalize`].
    pub fn renormalize(&mut self) {
        *self = Atom::normalize(&self.0);
    }
}

impl Display for Atom {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Atom {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Atom {
    fn from(value: &str) -> Self {
        Atom::normalize(value)
    }
}
