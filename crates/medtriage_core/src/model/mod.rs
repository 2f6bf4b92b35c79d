//! Domain model for the triage knowledge base.
//!
//! # Responsibility
//! - Define canonical identifiers and the snapshot entity collections used
//!   by core business logic.
//!
//! # Invariants
//! - Every entity is identified by a normalized [`atom::Atom`].
//! - The [`snapshot::Snapshot`] is the unit of atomic replacement: either
//!   the whole knowledge base updates or none of it does.

pub mod atom;
pub mod snapshot;
