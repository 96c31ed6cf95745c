//! Query composition for `event_exception`.

use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::db::connection::DbConnection;
use crate::db::schema::event_exception;
use crate::model::exception::{EventException, NewEventException};

/// ## Summary
/// Inserts an exception; a duplicate (event, date) pair is a no-op, keeping
/// the marker unique per occurrence.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn insert(
    conn: &mut DbConnection<'_>,
    exception: &NewEventException<'_>,
) -> QueryResult<usize> {
    diesel::insert_into(event_exception::table)
        .values(exception)
        .on_conflict((
            event_exception::event_id,
            event_exception::exception_date,
        ))
        .do_nothing()
        .execute(conn)
        .await
}

/// ## Summary
/// Loads the exceptions recorded for one series template.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn for_event(
    conn: &mut DbConnection<'_>,
    event_id: Uuid,
) -> QueryResult<Vec<EventException>> {
    event_exception::table
        .filter(event_exception::event_id.eq(event_id))
        .order(event_exception::exception_date.asc())
        .select(EventException::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Loads (event id, date) exception pairs for the given series templates.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn dates_for_events(
    conn: &mut DbConnection<'_>,
    event_ids: Vec<Uuid>,
) -> QueryResult<Vec<(Uuid, NaiveDate)>> {
    event_exception::table
        .filter(event_exception::event_id.eq_any(event_ids))
        .select((event_exception::event_id, event_exception::exception_date))
        .load(conn)
        .await
}

/// ## Summary
/// Deletes exceptions dated at or after `from`; the truncated series no
/// longer generates anything for them to suppress.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn delete_from_date(
    conn: &mut DbConnection<'_>,
    event_id: Uuid,
    from: NaiveDate,
) -> QueryResult<usize> {
    diesel::delete(
        event_exception::table
            .filter(event_exception::event_id.eq(event_id))
            .filter(event_exception::exception_date.ge(from)),
    )
    .execute(conn)
    .await
}

/// ## Summary
/// Moves exceptions dated at or after `from` onto a successor template when
/// a series is split.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn reassign_from_date(
    conn: &mut DbConnection<'_>,
    old_event: Uuid,
    new_event: Uuid,
    from: NaiveDate,
) -> QueryResult<usize> {
    diesel::update(
        event_exception::table
            .filter(event_exception::event_id.eq(old_event))
            .filter(event_exception::exception_date.ge(from)),
    )
    .set(event_exception::event_id.eq(new_event))
    .execute(conn)
    .await
}
