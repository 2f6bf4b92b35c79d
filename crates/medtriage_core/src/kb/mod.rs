//! Knowledge-base fact store: text codec, persistence gateway and the
//! shared snapshot store.
//!
//! # Invariants
//! - The fact file on disk is always a complete rendering; partial writes
//!   cannot become visible.
//! - Validation guards the write path only; the read path parses leniently.

pub mod facts;
pub mod file;
pub mod store;
