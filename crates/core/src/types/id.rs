//! Newtype IDs for type-safe entity references.
//!
//! The CMS has shipped both numeric ids and string document ids for the same
//! entities. Every ID here is an opaque string: deserialization accepts a JSON
//! string or integer and normalizes integers to their decimal form, so
//! `4` and `"4"` name the same product.

/// Macro to define a type-safe opaque ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize` as a plain string
/// - `Deserialize` from either a string or an integer
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`
/// - `From<String>`, `From<&str>`, and `From<i64>` implementations
///
/// # Example
///
/// ```rust
/// # use cozy_furniture_core::define_id;
/// define_id!(SofaId);
/// define_id!(ChairId);
///
/// let sofa = SofaId::new("1");
/// let chair = ChairId::from(1);
///
/// assert_eq!(sofa.as_str(), chair.as_str());
/// // These are different types, so this won't compile:
/// // let _: SofaId = chair;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, ::serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                struct IdVisitor;

                impl ::serde::de::Visitor<'_> for IdVisitor {
                    type Value = $name;

                    fn expecting(
                        &self,
                        f: &mut ::core::fmt::Formatter<'_>,
                    ) -> ::core::fmt::Result {
                        f.write_str("a string or integer identifier")
                    }

                    fn visit_str<E: ::serde::de::Error>(
                        self,
                        v: &str,
                    ) -> ::core::result::Result<Self::Value, E> {
                        Ok($name(v.to_owned()))
                    }

                    fn visit_string<E: ::serde::de::Error>(
                        self,
                        v: String,
                    ) -> ::core::result::Result<Self::Value, E> {
                        Ok($name(v))
                    }

                    fn visit_i64<E: ::serde::de::Error>(
                        self,
                        v: i64,
                    ) -> ::core::result::Result<Self::Value, E> {
                        Ok($name(v.to_string()))
                    }

                    fn visit_u64<E: ::serde::de::Error>(
                        self,
                        v: u64,
                    ) -> ::core::result::Result<Self::Value, E> {
                        Ok($name(v.to_string()))
                    }
                }

                deserializer.deserialize_any(IdVisitor)
            }
        }
    };
}

// Define catalog entity IDs
define_id!(ProductId);
define_id!(CategoryId);
define_id!(ColorId);
define_id!(MaterialId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_and_string_ids_are_equal() {
        let from_number: ProductId = serde_json::from_str("4").unwrap();
        let from_string: ProductId = serde_json::from_str("\"4\"").unwrap();
        assert_eq!(from_number, from_string);
        assert_eq!(from_number.as_str(), "4");
    }

    #[test]
    fn test_document_id_is_opaque() {
        let id: ProductId = serde_json::from_str("\"h7k2p9xq\"").unwrap();
        assert_eq!(id.to_string(), "h7k2p9xq");
    }

    #[test]
    fn test_serializes_as_string() {
        let id = ProductId::from(12);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"12\"");
    }

    #[test]
    fn test_rejects_non_scalar() {
        assert!(serde_json::from_str::<ProductId>("{\"id\": 1}").is_err());
        assert!(serde_json::from_str::<ProductId>("null").is_err());
    }
}
