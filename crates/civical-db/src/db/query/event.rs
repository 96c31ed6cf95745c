//! Query composition for `event`.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::db::connection::DbConnection;
use crate::db::schema::{event, recurrence_rule};
use crate::model::event::{Event, EventChanges, NewEvent};
use crate::model::recurrence::RecurrenceRule;

/// ## Summary
/// Inserts an event and returns the stored row.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn insert(conn: &mut DbConnection<'_>, new_event: &NewEvent<'_>) -> QueryResult<Event> {
    diesel::insert_into(event::table)
        .values(new_event)
        .returning(Event::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Applies a partial update to an event and returns the updated row.
///
/// ## Errors
/// Returns an error if the database operation fails or the row is missing.
pub async fn update(
    conn: &mut DbConnection<'_>,
    id: Uuid,
    changes: &EventChanges<'_>,
) -> QueryResult<Event> {
    diesel::update(event::table.find(id))
        .set(changes)
        .returning(Event::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Deletes an event row. Exceptions and materialized instances cascade via
/// their foreign keys.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn delete(conn: &mut DbConnection<'_>, id: Uuid) -> QueryResult<usize> {
    diesel::delete(event::table.find(id)).execute(conn).await
}

/// ## Summary
/// Fetches an event by id.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn by_id(conn: &mut DbConnection<'_>, id: Uuid) -> QueryResult<Option<Event>> {
    event::table
        .find(id)
        .select(Event::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Loads non-recurring events (materialized instances included) whose start
/// falls inside `[start, end)`.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn singles_in_window(
    conn: &mut DbConnection<'_>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> QueryResult<Vec<Event>> {
    event::table
        .filter(event::recurrence_id.is_null())
        .filter(event::starts_at.ge(start))
        .filter(event::starts_at.lt(end))
        .order(event::starts_at.asc())
        .select(Event::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Loads recurring templates (with their rules) that could produce
/// occurrences before `end`. Window intersection happens in the expander.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn templates_started_before(
    conn: &mut DbConnection<'_>,
    end: DateTime<Utc>,
) -> QueryResult<Vec<(Event, RecurrenceRule)>> {
    event::table
        .inner_join(recurrence_rule::table)
        .filter(event::starts_at.lt(end))
        .select((Event::as_select(), RecurrenceRule::as_select()))
        .load(conn)
        .await
}

/// ## Summary
/// Loads the materialized edited instances of one series.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn instances_of_series(
    conn: &mut DbConnection<'_>,
    series_id: Uuid,
) -> QueryResult<Vec<Event>> {
    event::table
        .filter(event::series_id.eq(series_id))
        .order(event::original_start_date.asc())
        .select(Event::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Loads the (series id, original start date) pairs of materialized edited
/// instances for the given series templates.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn instance_dates_for_series(
    conn: &mut DbConnection<'_>,
    series_ids: Vec<Uuid>,
) -> QueryResult<Vec<(Uuid, NaiveDate)>> {
    let keys: Vec<Option<Uuid>> = series_ids.into_iter().map(Some).collect();
    let rows: Vec<(Option<Uuid>, Option<NaiveDate>)> = event::table
        .filter(event::series_id.eq_any(keys))
        .select((event::series_id, event::original_start_date))
        .load(conn)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(series, date)| Some((series?, date?)))
        .collect())
}

/// ## Summary
/// Re-points materialized instances dated at or after `from` to a successor
/// series template.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn reassign_series(
    conn: &mut DbConnection<'_>,
    old_series: Uuid,
    new_series: Uuid,
    from: NaiveDate,
) -> QueryResult<usize> {
    diesel::update(
        event::table
            .filter(event::series_id.eq(old_series))
            .filter(event::original_start_date.ge(from)),
    )
    .set(event::series_id.eq(new_series))
    .execute(conn)
    .await
}

/// ## Summary
/// Deletes the materialized instances of a series dated at or after `from`.
///
/// Used when the tail of a series is deleted: the edited instances belong
/// to the removed portion and go with it.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn delete_instances_from(
    conn: &mut DbConnection<'_>,
    series_id: Uuid,
    from: NaiveDate,
) -> QueryResult<usize> {
    diesel::delete(
        event::table
            .filter(event::series_id.eq(series_id))
            .filter(event::original_start_date.ge(from)),
    )
    .execute(conn)
    .await
}

/// ## Summary
/// Clears the category reference from every event using it.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn clear_category(conn: &mut DbConnection<'_>, category_id: Uuid) -> QueryResult<usize> {
    diesel::update(event::table.filter(event::category_id.eq(category_id)))
        .set(event::category_id.eq(None::<Uuid>))
        .execute(conn)
        .await
}
