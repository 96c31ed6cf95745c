//! Database enum types with Diesel serialization.
//!
//! This module provides type-safe enum wrappers for database CHECK constraints.
//! Each enum implements `ToSql` and `FromSql` for automatic conversion between Rust and `PostgreSQL`.

use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use std::fmt;
use std::io::Write;

/// Role tier of a profile.
///
/// Maps to `profile.role` CHECK constraint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
pub enum Role {
    Member,
    Manager,
    Admin,
}

impl ToSql<Text, Pg> for Role {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        let s = match self {
            Self::Member => "member",
            Self::Manager => "manager",
            Self::Admin => "admin",
        };
        out.write_all(s.as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for Role {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"member" => Ok(Self::Member),
            b"manager" => Ok(Self::Manager),
            b"admin" => Ok(Self::Admin),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl Role {
    /// Returns the database string representation of this role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Role> for civical_core::types::Role {
    fn from(db_role: Role) -> Self {
        match db_role {
            Role::Member => Self::Member,
            Role::Manager => Self::Manager,
            Role::Admin => Self::Admin,
        }
    }
}

impl From<civical_core::types::Role> for Role {
    fn from(core_role: civical_core::types::Role) -> Self {
        match core_role {
            civical_core::types::Role::Member => Self::Member,
            civical_core::types::Role::Manager => Self::Manager,
            civical_core::types::Role::Admin => Self::Admin,
        }
    }
}

/// Event visibility.
///
/// Maps to `event.visibility` CHECK constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum Visibility {
    Public,
    Internal,
    Private,
}

impl ToSql<Text, Pg> for Visibility {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        let s = match self {
            Self::Public => "public",
            Self::Internal => "internal",
            Self::Private => "private",
        };
        out.write_all(s.as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for Visibility {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"public" => Ok(Self::Public),
            b"internal" => Ok(Self::Internal),
            b"private" => Ok(Self::Private),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl Visibility {
    /// Returns the database string representation of this visibility.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Internal => "internal",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Visibility> for civical_core::types::Visibility {
    fn from(db_visibility: Visibility) -> Self {
        match db_visibility {
            Visibility::Public => Self::Public,
            Visibility::Internal => Self::Internal,
            Visibility::Private => Self::Private,
        }
    }
}

impl From<civical_core::types::Visibility> for Visibility {
    fn from(core_visibility: civical_core::types::Visibility) -> Self {
        match core_visibility {
            civical_core::types::Visibility::Public => Self::Public,
            civical_core::types::Visibility::Internal => Self::Internal,
            civical_core::types::Visibility::Private => Self::Private,
        }
    }
}

/// Recurrence frequency.
///
/// Maps to `recurrence_rule.frequency` CHECK constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl ToSql<Text, Pg> for Frequency {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        let s = match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        };
        out.write_all(s.as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for Frequency {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"daily" => Ok(Self::Daily),
            b"weekly" => Ok(Self::Weekly),
            b"monthly" => Ok(Self::Monthly),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl Frequency {
    /// Returns the database string representation of this frequency.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Frequency> for civical_recur::Frequency {
    fn from(db_frequency: Frequency) -> Self {
        match db_frequency {
            Frequency::Daily => Self::Daily,
            Frequency::Weekly => Self::Weekly,
            Frequency::Monthly => Self::Monthly,
        }
    }
}

impl From<civical_recur::Frequency> for Frequency {
    fn from(frequency: civical_recur::Frequency) -> Self {
        match frequency {
            civical_recur::Frequency::Daily => Self::Daily,
            civical_recur::Frequency::Weekly => Self::Weekly,
            civical_recur::Frequency::Monthly => Self::Monthly,
        }
    }
}
