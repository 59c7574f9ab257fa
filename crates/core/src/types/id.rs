//! String ids for catalog, cart and order records.
//!
//! Ids look like `prod-1` or `reel-1712345678901`. Each record kind gets its
//! own wrapper from [`define_id!`] so a `SellerId` cannot be passed where a
//! `ProductId` is expected.

/// Declare a `String`-backed id type whose generated values start with
/// `$prefix-`.
///
/// ```rust
/// # use kala_connect_core::define_id;
/// define_id!(StallId, "stall");
///
/// let stall = StallId::new("stall-7");
/// assert_eq!(stall.to_string(), "stall-7");
/// assert!(StallId::generate().as_str().starts_with("stall-"));
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
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
            pub const PREFIX: &'static str = $prefix;

            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// `<prefix>-<unix millis>-<8 random hex>`, unique within a millisecond.
            #[must_use]
            pub fn generate() -> Self {
                Self($crate::types::id::generated_id(Self::PREFIX))
            }

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

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

#[doc(hidden)]
#[must_use]
pub fn generated_id(prefix: &str) -> String {
    let nonce = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}-{}", chrono::Utc::now().timestamp_millis(), &nonce[..8])
}

// Record ids
define_id!(ProductId, "prod");
define_id!(ReviewId, "rev");
define_id!(OrderId, "order");
define_id!(ReelId, "reel");
define_id!(SellerId, "seller");
define_id!(SharedCartId, "cart");
