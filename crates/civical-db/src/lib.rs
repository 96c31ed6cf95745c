//! PostgreSQL persistence for Civical: connection pooling, schema, typed
//! enum columns, models, and query modules, built on diesel-async.

pub mod db;
pub mod error;
pub mod model;

use diesel_migrations::{EmbeddedMigrations, embed_migrations};

/// Embedded SQL migrations, applied by the deployment tooling.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();
