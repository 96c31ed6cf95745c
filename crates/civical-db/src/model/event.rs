use diesel::{pg::Pg, prelude::*};

use crate::db::{enums::Visibility, schema};

/// A calendar event row.
///
/// Three shapes share this table:
/// - plain events (`recurrence_id` and `series_id` both unset),
/// - series templates (`recurrence_id` set), never listed directly; only
///   their expansions are,
/// - materialized edited instances (`series_id` + `original_start_date`
///   set): a standalone event that replaces the occurrence its series would
///   have generated on that date.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::event)]
#[diesel(check_for_backend(Pg))]
pub struct Event {
    pub id: uuid::Uuid,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: chrono::DateTime<chrono::Utc>,
    pub ends_at: chrono::DateTime<chrono::Utc>,
    pub all_day: bool,
    pub location: Option<String>,
    pub visibility: Visibility,
    pub category_id: Option<uuid::Uuid>,
    pub owner_id: uuid::Uuid,
    pub recurrence_id: Option<uuid::Uuid>,
    pub series_id: Option<uuid::Uuid>,
    pub original_start_date: Option<chrono::NaiveDate>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Event {
    /// True when this row is a recurring-series template.
    #[must_use]
    pub const fn is_template(&self) -> bool {
        self.recurrence_id.is_some()
    }

    /// Event duration; occurrences generated from a template keep it.
    #[must_use]
    pub fn duration(&self) -> chrono::TimeDelta {
        self.ends_at.signed_duration_since(self.starts_at)
    }
}

/// Insert struct for creating new events
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::event)]
pub struct NewEvent<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub starts_at: chrono::DateTime<chrono::Utc>,
    pub ends_at: chrono::DateTime<chrono::Utc>,
    pub all_day: bool,
    pub location: Option<&'a str>,
    pub visibility: Visibility,
    pub category_id: Option<uuid::Uuid>,
    pub owner_id: uuid::Uuid,
    pub recurrence_id: Option<uuid::Uuid>,
    pub series_id: Option<uuid::Uuid>,
    pub original_start_date: Option<chrono::NaiveDate>,
}

/// Partial update for an event; the owner is immutable and has no field
/// here. `updated_at` is always written.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schema::event)]
pub struct EventChanges<'a> {
    pub title: Option<&'a str>,
    pub description: Option<Option<&'a str>>,
    pub starts_at: Option<chrono::DateTime<chrono::Utc>>,
    pub ends_at: Option<chrono::DateTime<chrono::Utc>>,
    pub all_day: Option<bool>,
    pub location: Option<Option<&'a str>>,
    pub visibility: Option<Visibility>,
    pub category_id: Option<Option<uuid::Uuid>>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
