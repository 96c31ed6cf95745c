use diesel::{pg::Pg, prelude::*};
use serde::{Deserialize, Serialize};

use crate::db::schema;

// Re-export Role for public API
pub use crate::db::enums::Role;

/// Persisted principal record: one row per authenticated account.
///
/// Anonymous viewers have no profile; the identity layer hands the service
/// either nothing or this row's id plus role.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Identifiable, Queryable, Selectable, Serialize, Deserialize,
)]
#[diesel(table_name = schema::profile)]
#[diesel(check_for_backend(Pg))]
pub struct Profile {
    pub id: uuid::Uuid,
    pub display_name: Option<String>,
    pub role: Role,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::profile)]
pub struct NewProfile<'a> {
    pub id: uuid::Uuid,
    pub display_name: Option<&'a str>,
    pub role: Role,
}
