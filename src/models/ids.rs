//! Strongly-typed ID wrappers for ledger entities
//!
//! Ids are opaque strings: freshly created entities get a UUID v4, while the
//! seeded default categories keep short stable ids ("1".."11") and recurring
//! auto-posts use a deterministic id derived from the month and category.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Wrap an existing identifier
            pub fn from_string(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().to_string()))
            }
        }
    };
}

define_id!(TransactionId);
define_id!(CategoryId);

impl TransactionId {
    /// Deterministic id for the recurring auto-post of `category_id` in `period_key`
    pub fn for_auto_post(period_key: &str, category_id: &CategoryId) -> Self {
        Self(format!("auto-{}-{}", period_key, category_id))
    }

    /// Whether this id was produced by [`TransactionId::for_auto_post`]
    pub fn is_auto_post(&self) -> bool {
        self.0.starts_with("auto-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_are_unique() {
        let a = TransactionId::new();
        let b = TransactionId::new();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn test_short_ids_are_kept() {
        let id = CategoryId::from("3");
        assert_eq!(id.to_string(), "3");
        assert_eq!("3".parse::<CategoryId>().unwrap(), id);
    }

    #[test]
    fn test_auto_post_id_is_deterministic() {
        let category = CategoryId::from("1");
        let first = TransactionId::for_auto_post("2024-3", &category);
        let second = TransactionId::for_auto_post("2024-3", &category);
        assert_eq!(first, second);
        assert_eq!(first.as_str(), "auto-2024-3-1");
        assert!(first.is_auto_post());
        assert!(!TransactionId::new().is_auto_post());
    }

    #[test]
    fn test_id_serialization() {
        let id = CategoryId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let deserialized: CategoryId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
