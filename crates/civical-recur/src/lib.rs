//! Recurrence rules and occurrence expansion.
//!
//! A [`Rule`] describes how an event template repeats; [`expand`] turns a
//! validated rule plus the template's start into the concrete occurrence
//! times intersecting a query window. Expansion is a pure function: no
//! state survives between calls, and it never fails on a validated rule.

pub mod error;
pub mod expand;
pub mod rule;

pub use error::{RecurError, RecurResult};
pub use expand::{ExpansionOptions, expand};
pub use rule::{Frequency, Rule};
