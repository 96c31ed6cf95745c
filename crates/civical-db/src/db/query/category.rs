//! Query composition for `category`.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::db::connection::DbConnection;
use crate::db::schema::category;
use crate::model::category::{Category, CategoryChanges, NewCategory};

/// ## Summary
/// Inserts a category and returns the stored row.
///
/// ## Errors
/// Returns an error if the database operation fails, including a unique
/// violation on the name.
pub async fn insert(
    conn: &mut DbConnection<'_>,
    new_category: &NewCategory<'_>,
) -> QueryResult<Category> {
    diesel::insert_into(category::table)
        .values(new_category)
        .returning(Category::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Applies a partial update to a category and returns the updated row.
///
/// ## Errors
/// Returns an error if the database operation fails or the row is missing.
pub async fn update(
    conn: &mut DbConnection<'_>,
    id: Uuid,
    changes: &CategoryChanges<'_>,
) -> QueryResult<Category> {
    diesel::update(category::table.find(id))
        .set(changes)
        .returning(Category::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Soft-deletes a category by clearing its active flag; events keep their
/// reference.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn deactivate(conn: &mut DbConnection<'_>, id: Uuid) -> QueryResult<usize> {
    diesel::update(category::table.find(id))
        .set((category::active.eq(false), category::updated_at.eq(Utc::now())))
        .execute(conn)
        .await
}

/// ## Summary
/// Sets a category's display order.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn set_position(
    conn: &mut DbConnection<'_>,
    id: Uuid,
    position: i32,
) -> QueryResult<usize> {
    diesel::update(category::table.find(id))
        .set((
            category::position.eq(position),
            category::updated_at.eq(Utc::now()),
        ))
        .execute(conn)
        .await
}

/// ## Summary
/// Hard-deletes a category row. Callers clear event references first in the
/// same transaction.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn remove(conn: &mut DbConnection<'_>, id: Uuid) -> QueryResult<usize> {
    diesel::delete(category::table.find(id)).execute(conn).await
}

/// ## Summary
/// Fetches a category by id.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn by_id(conn: &mut DbConnection<'_>, id: Uuid) -> QueryResult<Option<Category>> {
    category::table
        .find(id)
        .select(Category::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Loads the active categories in display order.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn all_active(conn: &mut DbConnection<'_>) -> QueryResult<Vec<Category>> {
    category::table
        .filter(category::active.eq(true))
        .order((category::position.asc(), category::name.asc()))
        .select(Category::as_select())
        .load(conn)
        .await
}
