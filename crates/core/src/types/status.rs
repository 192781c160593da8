//! Product moderation status.

use serde::{Deserialize, Serialize};

/// Moderation lifecycle of a product listing.
///
/// Every submission enters as `Pending`; only an admin moves it to
/// `Approved` or `Denied`. The product's `approved` flag on the wire is
/// derived from this status and never stored separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    #[default]
    Pending,
    Approved,
    Denied,
}

impl ModerationStatus {
    /// Whether this status makes the product publicly visible.
    #[must_use]
    pub const fn is_approved(self) -> bool {
        matches!(self, Self::Approved)
    }

    /// Canonical lowercase name, as stored and serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Denied => "denied",
        }
    }
}

impl std::fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ModerationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "denied" => Ok(Self::Denied),
            _ => Err(format!("invalid moderation status: {s}")),
        }
    }
}

// Stored as TEXT; decode fails closed on unknown values.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for ModerationStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ModerationStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse::<Self>()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for ModerationStatus {
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
    fn test_default_is_pending() {
        assert_eq!(ModerationStatus::default(), ModerationStatus::Pending);
        assert!(!ModerationStatus::default().is_approved());
    }

    #[test]
    fn test_only_approved_is_approved() {
        assert!(ModerationStatus::Approved.is_approved());
        assert!(!ModerationStatus::Denied.is_approved());
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&ModerationStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!("denied".parse::<ModerationStatus>().unwrap(), ModerationStatus::Denied);
        assert!("rejected".parse::<ModerationStatus>().is_err());
    }
}
