//! Orchestration layer for Civical: access policy, window queries over
//! events and their expansions, mutation flows (including instance-vs-series
//! branching for recurring events), category administration, and role
//! management.
//!
//! The identity collaborator hands every entry point an already
//! authenticated [`auth::Principal`]; no credential verification happens
//! here. The database re-enforces the same visibility and ownership rules
//! through its own policies; both layers check every request.

pub mod auth;
pub mod calendar;
pub mod category;
pub mod error;
pub mod roles;
