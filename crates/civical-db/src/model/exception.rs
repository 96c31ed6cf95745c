use diesel::{pg::Pg, prelude::*};

use crate::db::schema;
use crate::model::event::Event;

/// Per-date suppression marker for one occurrence of a recurring series.
///
/// Unique per (event, date); inserting a duplicate is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = schema::event_exception)]
#[diesel(belongs_to(Event))]
#[diesel(check_for_backend(Pg))]
pub struct EventException {
    pub id: uuid::Uuid,
    pub event_id: uuid::Uuid,
    pub exception_date: chrono::NaiveDate,
    pub reason: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::event_exception)]
pub struct NewEventException<'a> {
    pub event_id: uuid::Uuid,
    pub exception_date: chrono::NaiveDate,
    pub reason: Option<&'a str>,
}
