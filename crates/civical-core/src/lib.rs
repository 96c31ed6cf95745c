//! Shared foundation for the Civical workspace: configuration loading, the
//! core error type, domain enums, and field-limit constants.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
