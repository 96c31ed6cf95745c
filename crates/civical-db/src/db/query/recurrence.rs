//! Query composition for `recurrence_rule`.

use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::db::connection::DbConnection;
use crate::db::schema::recurrence_rule;
use crate::model::recurrence::{NewRecurrenceRule, RecurrenceRule};

/// ## Summary
/// Inserts a recurrence rule and returns the stored row.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn insert(
    conn: &mut DbConnection<'_>,
    new_rule: &NewRecurrenceRule,
) -> QueryResult<RecurrenceRule> {
    diesel::insert_into(recurrence_rule::table)
        .values(new_rule)
        .returning(RecurrenceRule::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Fetches a recurrence rule by id.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn by_id(
    conn: &mut DbConnection<'_>,
    id: Uuid,
) -> QueryResult<Option<RecurrenceRule>> {
    recurrence_rule::table
        .find(id)
        .select(RecurrenceRule::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Truncates a rule to end on `until`, clearing any occurrence count.
///
/// Used when a series is split or its tail deleted.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn truncate(
    conn: &mut DbConnection<'_>,
    id: Uuid,
    until: NaiveDate,
) -> QueryResult<usize> {
    diesel::update(recurrence_rule::table.find(id))
        .set((
            recurrence_rule::until.eq(Some(until)),
            recurrence_rule::count.eq(None::<i32>),
        ))
        .execute(conn)
        .await
}

/// ## Summary
/// Replaces every rule field of an existing row.
///
/// ## Errors
/// Returns an error if the database operation fails or the row is missing.
pub async fn replace(
    conn: &mut DbConnection<'_>,
    id: Uuid,
    rule: &NewRecurrenceRule,
) -> QueryResult<RecurrenceRule> {
    diesel::update(recurrence_rule::table.find(id))
        .set(rule)
        .returning(RecurrenceRule::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Deletes a rule row; callers remove the referencing template first.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn delete(conn: &mut DbConnection<'_>, id: Uuid) -> QueryResult<usize> {
    diesel::delete(recurrence_rule::table.find(id))
        .execute(conn)
        .await
}
