//! Product categories.

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown category name.
#[derive(thiserror::Error, Debug, Clone)]
#[error("invalid product category: {0}")]
pub struct ProductCategoryError(pub String);

/// The fixed set of marketplace categories.
///
/// Wire and storage form is the capitalized name (`"Vehicle"`, ...), the
/// contract the SPA has always used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductCategory {
    Vehicle,
    Property,
    Miscellaneous,
}

impl ProductCategory {
    /// Canonical capitalized name, as stored and serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vehicle => "Vehicle",
            Self::Property => "Property",
            Self::Miscellaneous => "Miscellaneous",
        }
    }
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProductCategory {
    type Err = ProductCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Vehicle" => Ok(Self::Vehicle),
            "Property" => Ok(Self::Property),
            "Miscellaneous" => Ok(Self::Miscellaneous),
            _ => Err(ProductCategoryError(s.to_owned())),
        }
    }
}

// Stored as TEXT; decode fails closed on unknown values.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for ProductCategory {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ProductCategory {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse::<Self>()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for ProductCategory {
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
    fn test_wire_names_are_capitalized() {
        assert_eq!(
            serde_json::to_string(&ProductCategory::Vehicle).unwrap(),
            "\"Vehicle\""
        );
        assert_eq!(
            serde_json::to_string(&ProductCategory::Miscellaneous).unwrap(),
            "\"Miscellaneous\""
        );
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("vehicle".parse::<ProductCategory>().is_err());
        assert!("Food".parse::<ProductCategory>().is_err());
    }

    #[test]
    fn test_roundtrip() {
        for c in [
            ProductCategory::Vehicle,
            ProductCategory::Property,
            ProductCategory::Miscellaneous,
        ] {
            assert_eq!(c.as_str().parse::<ProductCategory>().unwrap(), c);
        }
    }
}
