use crate::db::models::User;

/// Object-level actions gated by ownership. Creation is not decided here;
/// create handlers verify parent ownership themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    View,
    Update,
    Delete,
}

impl Action {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Denied;

/// Allows the effective owner of an object, or any moderator.
pub(crate) fn authorize(
    principal: &User,
    effective_owner_id: &str,
    action: Action,
) -> Result<(), Denied> {
    if principal.id == effective_owner_id || principal.is_moderator {
        return Ok(());
    }

    tracing::debug!(
        user_id = %principal.id,
        owner_id = %effective_owner_id,
        action = action.as_str(),
        "authorization denied"
    );

    Err(Denied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn user(id: &str, is_moderator: bool) -> User {
        User {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            hashed_password: "hash".to_string(),
            is_active: true,
            is_moderator,
            created_at: datetime!(2025-01-01 00:00:00),
            updated_at: datetime!(2025-01-01 00:00:00),
        }
    }

    #[test]
    fn owner_is_allowed() {
        let principal = user("alice", false);
        assert!(authorize(&principal, "alice", Action::Update).is_ok());
        assert!(authorize(&principal, "alice", Action::View).is_ok());
        assert!(authorize(&principal, "alice", Action::Delete).is_ok());
    }

    #[test]
    fn moderator_is_allowed_on_foreign_objects() {
        let principal = user("mod", true);
        assert!(authorize(&principal, "alice", Action::Update).is_ok());
        assert!(authorize(&principal, "alice", Action::Delete).is_ok());
    }

    #[test]
    fn foreign_user_is_denied() {
        let principal = user("bob", false);
        assert_eq!(authorize(&principal, "alice", Action::View), Err(Denied));
        assert_eq!(authorize(&principal, "alice", Action::Update), Err(Denied));
        assert_eq!(authorize(&principal, "alice", Action::Delete), Err(Denied));
    }
}
