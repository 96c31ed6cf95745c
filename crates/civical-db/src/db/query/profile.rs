//! Query composition for `profile`.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::db::connection::DbConnection;
use crate::db::enums::Role;
use crate::db::schema::profile;
use crate::model::profile::{NewProfile, Profile};

/// ## Summary
/// Inserts a profile and returns the stored row.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn insert(
    conn: &mut DbConnection<'_>,
    new_profile: &NewProfile<'_>,
) -> QueryResult<Profile> {
    diesel::insert_into(profile::table)
        .values(new_profile)
        .returning(Profile::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Fetches a profile by id.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn by_id(conn: &mut DbConnection<'_>, id: Uuid) -> QueryResult<Option<Profile>> {
    profile::table
        .find(id)
        .select(Profile::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Counts the admins currently in the system.
///
/// Read inside the same transaction as a role change so the last-admin
/// invariant cannot race a concurrent demotion.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn admin_count(conn: &mut DbConnection<'_>) -> QueryResult<i64> {
    profile::table
        .filter(profile::role.eq(Role::Admin))
        .count()
        .get_result(conn)
        .await
}

/// ## Summary
/// Writes a profile's role and returns the updated row.
///
/// ## Errors
/// Returns an error if the database operation fails or the row is missing.
pub async fn set_role(conn: &mut DbConnection<'_>, id: Uuid, role: Role) -> QueryResult<Profile> {
    diesel::update(profile::table.find(id))
        .set((profile::role.eq(role), profile::updated_at.eq(Utc::now())))
        .returning(Profile::as_returning())
        .get_result(conn)
        .await
}
