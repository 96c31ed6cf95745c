use diesel::{pg::Pg, prelude::*};

use crate::db::schema;

/// Named, colored tag for grouping events.
///
/// Deactivation is a soft delete: `active` flips and existing events keep
/// their reference.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::category)]
#[diesel(check_for_backend(Pg))]
pub struct Category {
    pub id: uuid::Uuid,
    pub name: String,
    pub color: String,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub position: i32,
    pub active: bool,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Insert struct for creating new categories
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::category)]
pub struct NewCategory<'a> {
    pub name: &'a str,
    pub color: &'a str,
    pub icon: Option<&'a str>,
    pub description: Option<&'a str>,
    pub position: i32,
}

/// Partial update for a category; `updated_at` is always written.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schema::category)]
pub struct CategoryChanges<'a> {
    pub name: Option<&'a str>,
    pub color: Option<&'a str>,
    pub icon: Option<Option<&'a str>>,
    pub description: Option<Option<&'a str>>,
    pub position: Option<i32>,
    pub active: Option<bool>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
