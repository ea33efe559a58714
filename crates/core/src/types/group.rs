//! Capability groups for token-gated permissions.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown [`Group`] label.
#[derive(thiserror::Error, Debug, Clone)]
#[error("unknown group: {0}")]
pub struct GroupError(pub String);

/// A capability label attached to a user and to every token issued to them.
///
/// Permission checks are exact-match set membership: `Admin` does NOT imply
/// `Editor`, and no hierarchy exists. Endpoints that accept more than one
/// group spell the alternatives out explicitly.
///
/// `User` is reserved for accounts created through social login; it is not
/// assignable at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Group {
    Admin,
    Viewer,
    Editor,
    #[serde(rename = "user")]
    User,
}

impl Group {
    /// Groups a caller may pick at registration.
    pub const ASSIGNABLE: [Self; 3] = [Self::Admin, Self::Viewer, Self::Editor];

    /// The canonical string label, as stored and transported.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Viewer => "Viewer",
            Self::Editor => "Editor",
            Self::User => "user",
        }
    }

    /// Parse a group from its canonical label.
    ///
    /// # Errors
    ///
    /// Returns `GroupError` for any label outside the fixed set.
    pub fn parse(s: &str) -> Result<Self, GroupError> {
        match s {
            "Admin" => Ok(Self::Admin),
            "Viewer" => Ok(Self::Viewer),
            "Editor" => Ok(Self::Editor),
            "user" => Ok(Self::User),
            other => Err(GroupError(other.to_owned())),
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Group {
    type Err = GroupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// SQLx support (with postgres feature): stored as TEXT.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Group {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Group {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Group {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        for group in [Group::Admin, Group::Viewer, Group::Editor, Group::User] {
            assert_eq!(Group::parse(group.as_str()).unwrap(), group);
        }
    }

    #[test]
    fn test_parse_unknown() {
        assert!(Group::parse("SuperAdmin").is_err());
        // Labels are case-sensitive
        assert!(Group::parse("admin").is_err());
        assert!(Group::parse("User").is_err());
    }

    #[test]
    fn test_serde_labels() {
        assert_eq!(serde_json::to_string(&Group::Admin).unwrap(), "\"Admin\"");
        assert_eq!(serde_json::to_string(&Group::User).unwrap(), "\"user\"");
        let parsed: Group = serde_json::from_str("\"Editor\"").unwrap();
        assert_eq!(parsed, Group::Editor);
    }

    #[test]
    fn test_assignable_excludes_user() {
        assert!(!Group::ASSIGNABLE.contains(&Group::User));
        assert_eq!(Group::ASSIGNABLE.len(), 3);
    }
}
