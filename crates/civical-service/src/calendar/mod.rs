//! Calendar orchestration.
//!
//! ## Module Organization
//!
//! - `assemble`: pure composition of singles and expanded series into one
//!   visible, deterministically ordered sequence
//! - `query`: window listing against the database
//! - `mutation`: create/update/delete flows, including the
//!   instance-vs-series branching for recurring events

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;

use civical_db::model::event::Event;
use civical_recur::Rule;

use crate::error::{ServiceError, ServiceResult};

pub mod assemble;
pub mod mutation;
pub mod query;

#[cfg(test)]
mod assemble_tests;

pub use assemble::assemble_window;
pub use mutation::{
    EditScope, EventDraft, EventPatch, create_event, delete_event, delete_occurrence,
    edit_occurrence, update_event,
};
pub use query::list_visible_events;

/// Half-open query window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// ## Summary
    /// Builds a window, rejecting empty or inverted ranges.
    ///
    /// ## Errors
    /// Returns a validation error when `end <= start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> ServiceResult<Self> {
        if end <= start {
            return Err(ServiceError::ValidationError(
                "window end must be after its start".to_owned(),
            ));
        }
        Ok(Self { start, end })
    }
}

/// One entry of a window listing: a concrete event, either stored as-is or
/// generated from a series template.
///
/// Generated entries reuse the template's id and carry the computed
/// occurrence date; materialized edited instances carry the date they
/// replace.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    pub event: Event,
    pub original_start_date: Option<NaiveDate>,
}

/// Everything needed to expand one recurring series over a window.
#[derive(Debug, Clone)]
pub struct SeriesData {
    pub template: Event,
    pub rule: Rule,
    /// Dates suppressed by stored exceptions.
    pub exdates: HashSet<NaiveDate>,
    /// Dates replaced by materialized edited instances; the singles path
    /// returns those concrete events instead.
    pub override_dates: HashSet<NaiveDate>,
}
