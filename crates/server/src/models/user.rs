//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tradepost_core::{Email, Role, UserId};

/// A marketplace user.
///
/// The password hash never leaves the repository layer; this type is safe
/// to serialize in responses.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub full_name: String,
    /// Login email (unique).
    pub email: Email,
    /// Account role.
    pub role: Role,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape_is_camel_case_without_credentials() {
        let user = User {
            id: UserId::new(),
            full_name: "Alice Example".to_owned(),
            email: Email::parse("alice@example.com").unwrap(),
            role: Role::User,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("fullName").is_some());
        assert_eq!(json["role"], "user");
        // No credential material on the wire, under any spelling.
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
    }
}
