//! Pure access predicates.
//!
//! The whole permission matrix lives in these four functions, dispatched
//! over the flat [`Role`] enum so the rule set stays auditable in one
//! place. No I/O, no side effects; the orchestrators gather whatever state
//! a check needs (such as the current admin count) and pass it in.

use civical_core::types::{Role, Visibility};
use uuid::Uuid;

use super::principal::Principal;

/// ## Summary
/// Decides whether `principal` may read an event with the given visibility
/// and owner.
///
/// Public events are readable by everyone, anonymous viewers included.
/// Internal events need any authenticated principal. Private events are
/// readable only by their owner or an admin. Category membership never
/// affects access.
#[must_use]
pub fn can_view(visibility: Visibility, owner_id: Uuid, principal: &Principal) -> bool {
    match visibility {
        Visibility::Public => true,
        Visibility::Internal => principal.is_authenticated(),
        Visibility::Private => principal.is_admin() || principal.id() == Some(owner_id),
    }
}

/// ## Summary
/// Decides whether `principal` may create events: managers and admins only.
#[must_use]
pub fn can_create(principal: &Principal) -> bool {
    principal.role().is_some_and(Role::can_author)
}

/// ## Summary
/// Decides whether `principal` may edit or delete an event owned by
/// `owner_id` (one rule covers both operations).
///
/// Admins always may; otherwise the principal must be the owner *and* hold
/// a role that can author events. The check reads the role current at
/// evaluation time; a role change applies from the next evaluation on.
#[must_use]
pub fn can_modify(owner_id: Uuid, principal: &Principal) -> bool {
    principal.is_admin() || (principal.id() == Some(owner_id) && can_create(principal))
}

/// ## Summary
/// Decides whether `actor` may change `target`'s role to `new_role`.
///
/// Only admins change roles, never their own: self-role-change is refused
/// for admins too. Demoting an admin while `admin_count` is at one is
/// refused from any actor: the system keeps at least one admin. The count
/// must come from the full current profile set, read in the same
/// transaction as the write.
#[must_use]
pub fn can_change_role(
    actor: &Principal,
    target_id: Uuid,
    target_role: Role,
    new_role: Role,
    admin_count: i64,
) -> bool {
    if !actor.is_admin() {
        return false;
    }
    if actor.id() == Some(target_id) {
        return false;
    }
    if target_role == Role::Admin && new_role != Role::Admin && admin_count <= 1 {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> Principal {
        Principal::authenticated(Uuid::new_v4(), role)
    }

    #[test]
    fn public_events_visible_to_everyone() {
        let owner = Uuid::new_v4();
        for principal in [
            Principal::Anonymous,
            user(Role::Member),
            user(Role::Manager),
            user(Role::Admin),
        ] {
            assert!(can_view(Visibility::Public, owner, &principal));
        }
    }

    #[test]
    fn internal_events_need_authentication() {
        let owner = Uuid::new_v4();
        assert!(!can_view(Visibility::Internal, owner, &Principal::Anonymous));
        assert!(can_view(Visibility::Internal, owner, &user(Role::Member)));
        assert!(can_view(Visibility::Internal, owner, &user(Role::Admin)));
    }

    #[test]
    fn private_events_are_owner_or_admin_only() {
        let owner = Uuid::new_v4();
        let owner_principal = Principal::authenticated(owner, Role::Manager);

        assert!(can_view(Visibility::Private, owner, &owner_principal));
        assert!(can_view(Visibility::Private, owner, &user(Role::Admin)));
        assert!(!can_view(Visibility::Private, owner, &user(Role::Member)));
        assert!(!can_view(Visibility::Private, owner, &user(Role::Manager)));
        assert!(!can_view(Visibility::Private, owner, &Principal::Anonymous));
    }

    #[test]
    fn creation_is_manager_and_admin_only() {
        assert!(!can_create(&Principal::Anonymous));
        assert!(!can_create(&user(Role::Member)));
        assert!(can_create(&user(Role::Manager)));
        assert!(can_create(&user(Role::Admin)));
    }

    #[test]
    fn owners_modify_only_with_an_authoring_role() {
        let owner = Uuid::new_v4();

        assert!(can_modify(
            owner,
            &Principal::authenticated(owner, Role::Manager)
        ));
        // A member who somehow owns an event still may not touch it.
        assert!(!can_modify(
            owner,
            &Principal::authenticated(owner, Role::Member)
        ));
        assert!(!can_modify(owner, &user(Role::Manager)));
        assert!(can_modify(owner, &user(Role::Admin)));
        assert!(!can_modify(owner, &Principal::Anonymous));
    }

    #[test]
    fn self_role_change_is_always_refused() {
        let id = Uuid::new_v4();
        let admin = Principal::authenticated(id, Role::Admin);

        for new_role in [Role::Member, Role::Manager, Role::Admin] {
            assert!(!can_change_role(&admin, id, Role::Admin, new_role, 5));
        }
    }

    #[test]
    fn only_admins_change_roles() {
        let target = Uuid::new_v4();
        assert!(!can_change_role(
            &user(Role::Manager),
            target,
            Role::Member,
            Role::Manager,
            2
        ));
        assert!(can_change_role(
            &user(Role::Admin),
            target,
            Role::Member,
            Role::Manager,
            2
        ));
    }

    #[test]
    fn demoting_the_last_admin_is_refused_for_any_actor() {
        let target = Uuid::new_v4();
        let other_admin = user(Role::Admin);

        assert!(!can_change_role(
            &other_admin,
            target,
            Role::Admin,
            Role::Member,
            1
        ));
        // With a second admin present the demotion goes through.
        assert!(can_change_role(
            &other_admin,
            target,
            Role::Admin,
            Role::Member,
            2
        ));
        // Re-confirming an admin is not a demotion.
        assert!(can_change_role(
            &other_admin,
            target,
            Role::Admin,
            Role::Admin,
            1
        ));
    }
}
