//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store and session calls into use-case level APIs.
//! - Keep HTTP/CLI layers decoupled from storage and scoring details.

pub mod triage_service;
