//! Role management with the last-admin invariant.

use diesel_async::{AsyncConnection, scoped_futures::ScopedFutureExt};
use uuid::Uuid;

use civical_core::types::Role;
use civical_db::db::connection::DbConnection;
use civical_db::db::query::profile;
use civical_db::model::profile::Profile;

use crate::auth::{Principal, policy};
use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Changes a profile's role.
///
/// The admin count is read inside the same transaction as the write, so two
/// concurrent demotions cannot both observe "two admins left" and strip the
/// system of its last one.
///
/// ## Errors
/// Returns `NotFound` for a missing target, `Forbidden` when the policy
/// refuses (non-admin actor, self-change, or demoting the last admin), or a
/// database error.
#[tracing::instrument(skip(conn, actor))]
pub async fn change_role<'a>(
    conn: &mut DbConnection<'a>,
    actor: &'a Principal,
    target_id: Uuid,
    new_role: Role,
) -> ServiceResult<Profile> {
    conn.transaction::<Profile, ServiceError, _>(|conn| {
        async move {
            let Some(target) = profile::by_id(conn, target_id).await? else {
                return Err(ServiceError::NotFound(format!("profile {target_id}")));
            };
            let admins = profile::admin_count(conn).await?;

            if !policy::can_change_role(actor, target_id, target.role.into(), new_role, admins) {
                return Err(ServiceError::Forbidden(
                    "role change refused".to_owned(),
                ));
            }

            let updated = profile::set_role(conn, target_id, new_role.into()).await?;
            tracing::info!(target = %target_id, role = %new_role, "Role changed");
            Ok(updated)
        }
        .scope_boxed()
    })
    .await
}
