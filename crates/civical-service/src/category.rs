//! Category administration. Every mutation here is admin-gated; listing is
//! open to any viewer since categories never affect event access.

use diesel_async::{AsyncConnection, scoped_futures::ScopedFutureExt};
use uuid::Uuid;

use civical_db::db::connection::DbConnection;
use civical_db::db::query::{category, event};
use civical_db::model::category::{Category, CategoryChanges, NewCategory};

use crate::auth::Principal;
use crate::error::{ServiceError, ServiceResult};

/// Fields for a new category.
#[derive(Debug, Clone)]
pub struct CategoryDraft {
    pub name: String,
    pub color: String,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub position: i32,
}

/// Partial update for a category.
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub position: Option<i32>,
}

/// ## Summary
/// Creates a category.
///
/// ## Errors
/// Returns `Forbidden` for non-admins, a validation error for an empty
/// name, `Conflict` when the name is taken, or a database error.
#[tracing::instrument(skip(conn, principal, draft), fields(name = %draft.name))]
pub async fn create_category(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    draft: &CategoryDraft,
) -> ServiceResult<Category> {
    require_admin(principal)?;
    validate_name(&draft.name)?;

    Ok(category::insert(
        conn,
        &NewCategory {
            name: &draft.name,
            color: &draft.color,
            icon: draft.icon.as_deref(),
            description: draft.description.as_deref(),
            position: draft.position,
        },
    )
    .await?)
}

/// ## Summary
/// Updates a category's fields.
///
/// ## Errors
/// Returns `Forbidden` for non-admins, `NotFound` for a missing id,
/// `Conflict` when a renamed category collides, or a database error.
#[tracing::instrument(skip(conn, principal, patch))]
pub async fn update_category(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    category_id: Uuid,
    patch: &CategoryPatch,
) -> ServiceResult<Category> {
    require_admin(principal)?;
    if let Some(name) = &patch.name {
        validate_name(name)?;
    }
    require_category(conn, category_id).await?;

    let changes = CategoryChanges {
        name: patch.name.as_deref(),
        color: patch.color.as_deref(),
        icon: patch.icon.as_ref().map(Option::as_deref),
        description: patch.description.as_ref().map(Option::as_deref),
        position: patch.position,
        active: None,
        updated_at: chrono::Utc::now(),
    };
    Ok(category::update(conn, category_id, &changes).await?)
}

/// ## Summary
/// Moves a category to a new display position.
///
/// ## Errors
/// Returns `Forbidden` for non-admins, `NotFound` for a missing id, or a
/// database error.
#[tracing::instrument(skip(conn, principal))]
pub async fn reorder_category(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    category_id: Uuid,
    position: i32,
) -> ServiceResult<()> {
    require_admin(principal)?;
    require_category(conn, category_id).await?;

    category::set_position(conn, category_id, position).await?;
    Ok(())
}

/// ## Summary
/// Soft-deletes a category: the active flag flips and events keep their
/// reference.
///
/// ## Errors
/// Returns `Forbidden` for non-admins, `NotFound` for a missing id, or a
/// database error.
#[tracing::instrument(skip(conn, principal))]
pub async fn deactivate_category(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    category_id: Uuid,
) -> ServiceResult<()> {
    require_admin(principal)?;
    require_category(conn, category_id).await?;

    category::deactivate(conn, category_id).await?;
    Ok(())
}

/// ## Summary
/// Hard-removes a category, clearing the reference from every event in the
/// same transaction; events are never deleted with it.
///
/// ## Errors
/// Returns `Forbidden` for non-admins, `NotFound` for a missing id, or a
/// database error.
#[tracing::instrument(skip(conn, principal))]
pub async fn remove_category(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    category_id: Uuid,
) -> ServiceResult<()> {
    require_admin(principal)?;
    require_category(conn, category_id).await?;

    conn.transaction::<(), ServiceError, _>(|conn| {
        async move {
            event::clear_category(conn, category_id).await?;
            category::remove(conn, category_id).await?;
            Ok(())
        }
        .scope_boxed()
    })
    .await
}

/// ## Summary
/// Lists the active categories in display order. Open to every viewer.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn list_categories(conn: &mut DbConnection<'_>) -> ServiceResult<Vec<Category>> {
    Ok(category::all_active(conn).await?)
}

fn require_admin(principal: &Principal) -> ServiceResult<()> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(
            "only admins manage categories".to_owned(),
        ))
    }
}

async fn require_category(conn: &mut DbConnection<'_>, category_id: Uuid) -> ServiceResult<()> {
    category::by_id(conn, category_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| ServiceError::NotFound(format!("category {category_id}")))
}

fn validate_name(name: &str) -> ServiceResult<()> {
    if name.trim().is_empty() {
        return Err(ServiceError::ValidationError(
            "category name must not be empty".to_owned(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use civical_core::types::Role;

    #[test]
    fn non_admins_are_refused() {
        for principal in [
            Principal::Anonymous,
            Principal::authenticated(Uuid::new_v4(), Role::Member),
            Principal::authenticated(Uuid::new_v4(), Role::Manager),
        ] {
            assert!(matches!(
                require_admin(&principal),
                Err(ServiceError::Forbidden(_))
            ));
        }
        assert!(require_admin(&Principal::authenticated(Uuid::new_v4(), Role::Admin)).is_ok());
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(validate_name("Fundraising").is_ok());
        assert!(matches!(
            validate_name("   "),
            Err(ServiceError::ValidationError(_))
        ));
    }
}
