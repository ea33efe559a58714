//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use orchard_core::{Email, Group, UserId};

/// An account holder (domain type).
///
/// Serializes without the password hash; this is the object returned by
/// `/admin/me` and the social login callback.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address (unique).
    pub email: Email,
    /// Capability group assigned at registration or social login.
    #[sqlx(rename = "group_name")]
    pub group: Group,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The authenticated caller of a protected endpoint.
///
/// Produced by the bearer-token extractor. The capability is the one the
/// token was issued with (the user's group at login time), not the user's
/// current group.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// The account the token belongs to.
    pub user: User,
    /// The single capability carried by the presented token.
    pub capability: Group,
}

impl CurrentUser {
    /// Exact-match capability check. No hierarchy: `Admin` does not imply
    /// `Editor` or vice versa.
    #[must_use]
    pub fn can(&self, required: Group) -> bool {
        self.capability == required
    }

    /// True if the token carries any of the listed capabilities.
    #[must_use]
    pub fn can_any(&self, required: &[Group]) -> bool {
        required.contains(&self.capability)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn current(capability: Group) -> CurrentUser {
        CurrentUser {
            user: User {
                id: UserId::new(1),
                name: "Test".to_owned(),
                email: Email::parse("t@example.com").unwrap(),
                group: capability,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            capability,
        }
    }

    #[test]
    fn test_can_exact_match_only() {
        assert!(current(Group::Admin).can(Group::Admin));
        assert!(!current(Group::Admin).can(Group::Editor));
        assert!(!current(Group::Viewer).can(Group::Admin));
        assert!(!current(Group::User).can(Group::Editor));
    }

    #[test]
    fn test_can_any() {
        let editor = current(Group::Editor);
        assert!(editor.can_any(&[Group::Admin, Group::Editor]));

        let viewer = current(Group::Viewer);
        assert!(!viewer.can_any(&[Group::Admin, Group::Editor]));
    }

    #[test]
    fn test_user_serialization_has_no_secrets() {
        let user = current(Group::Admin).user;
        let json = serde_json::to_value(&user).unwrap();
        let object = json.as_object().unwrap();
        assert!(object.contains_key("email"));
        assert!(object.contains_key("group"));
        assert!(!object.contains_key("password_hash"));
        assert_eq!(object["group"], "Admin");
    }
}
