//! Newtype IDs for type-safe entity references.
//!
//! The backend identifies products and sellers with opaque strings and shops
//! and users with integers. Use `define_id!` for numeric IDs and
//! `define_string_id!` for string IDs so the two kinds never get mixed up.

use thiserror::Error;

/// Errors that can occur when parsing a string ID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The input string is empty or whitespace.
    #[error("{kind} cannot be empty")]
    Empty {
        /// The ID type being parsed.
        kind: &'static str,
    },
}

/// Macro to define a type-safe numeric ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_i64()`
/// - `From<i64>` and `Into<i64>` implementations
///
/// # Example
///
/// ```rust
/// # use souk_core::define_id;
/// define_id!(ShopId);
/// define_id!(UserId);
///
/// let shop_id = ShopId::new(1);
/// let user_id = UserId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: ShopId = user_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with a validating `parse()`
/// that trims whitespace and rejects empty input, plus `as_str()`,
/// `Display` and transparent serde.
///
/// # Example
///
/// ```rust
/// # use souk_core::define_string_id;
/// define_string_id!(OrderRef);
///
/// let order = OrderRef::parse("  ord-42 ").unwrap();
/// assert_eq!(order.as_str(), "ord-42");
/// assert!(OrderRef::parse("   ").is_err());
/// ```
#[macro_export]
macro_rules! define_string_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse an ID, trimming surrounding whitespace.
            ///
            /// # Errors
            ///
            /// Returns `IdError::Empty` if nothing is left after trimming.
            pub fn parse(value: &str) -> ::core::result::Result<Self, $crate::types::id::IdError> {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err($crate::types::id::IdError::Empty {
                        kind: stringify!($name),
                    });
                }
                Ok(Self(trimmed.to_owned()))
            }

            /// Get the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::id::IdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

/// An entity with a stable identifier, used to deduplicate lists.
pub trait Identified {
    /// Identifier type.
    type Id: Clone + Eq + core::hash::Hash;

    /// The entity's identifier.
    fn id(&self) -> &Self::Id;
}

// Numeric IDs
define_id!(ShopId);
define_id!(UserId);

// String IDs
define_string_id!(ProductId);
define_string_id!(SellerId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_id_roundtrip() {
        let id = ShopId::new(42);
        assert_eq!(id.as_i64(), 42);
        assert_eq!(i64::from(id), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_string_id_trims() {
        let id = ProductId::parse("  abc123\n").unwrap();
        assert_eq!(id.as_str(), "abc123");
    }

    #[test]
    fn test_string_id_rejects_blank() {
        let err = ProductId::parse("   ").unwrap_err();
        assert_eq!(err, IdError::Empty { kind: "ProductId" });
        assert_eq!(err.to_string(), "ProductId cannot be empty");
    }

    #[test]
    fn test_string_id_serde_transparent() {
        let id = SellerId::parse("s-1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"s-1\"");
        let back: SellerId = serde_json::from_str("\"s-1\"").unwrap();
        assert_eq!(back, id);
    }
}
