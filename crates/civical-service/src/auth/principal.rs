use civical_core::types::Role;
use uuid::Uuid;

/// The viewer on whose behalf a request runs.
///
/// The identity collaborator supplies, per request, either nothing or an
/// already-authenticated `(id, role)` claim; this type is that input made
/// explicit. An authenticated principal has exactly one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Principal {
    Anonymous,
    User { id: Uuid, role: Role },
}

impl Principal {
    #[must_use]
    pub const fn authenticated(id: Uuid, role: Role) -> Self {
        Self::User { id, role }
    }

    /// Builds a principal from the identity layer's claim.
    #[must_use]
    pub fn from_claim(claim: Option<(Uuid, Role)>) -> Self {
        claim.map_or(Self::Anonymous, |(id, role)| Self::User { id, role })
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::User { .. })
    }

    #[must_use]
    pub const fn id(&self) -> Option<Uuid> {
        match self {
            Self::Anonymous => None,
            Self::User { id, .. } => Some(*id),
        }
    }

    /// The principal's current role; `None` for anonymous viewers.
    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        match self {
            Self::Anonymous => None,
            Self::User { role, .. } => Some(*role),
        }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(
            self,
            Self::User {
                role: Role::Admin,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_round_trip() {
        let id = Uuid::new_v4();
        assert_eq!(Principal::from_claim(None), Principal::Anonymous);
        assert_eq!(
            Principal::from_claim(Some((id, Role::Manager))),
            Principal::User {
                id,
                role: Role::Manager
            }
        );
    }

    #[test]
    fn anonymous_has_no_identity_and_no_role() {
        assert_eq!(Principal::Anonymous.id(), None);
        assert_eq!(Principal::Anonymous.role(), None);
        assert!(!Principal::Anonymous.is_admin());
    }
}
