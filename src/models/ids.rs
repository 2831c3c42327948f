//! Newtype wrappers for identifiers.
//!
//! Hotel codes, city codes, and auth user ids are all strings on the
//! wire; wrapping them keeps them from being mixed up.

use serde::{Deserialize, Serialize};

/// Macro to define a newtype ID wrapping a `String` inner type.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from the given string.
            #[inline]
            #[must_use]
            pub const fn new(value: String) -> Self {
                Self(value)
            }

            /// Returns a reference to the inner string.
            #[inline]
            #[must_use]
            pub fn as_inner(&self) -> &str {
                &self.0
            }

            /// Consumes the wrapper and returns the inner string.
            #[inline]
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<String> for $name {
            #[inline]
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            #[inline]
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }
    };
}

define_string_id! {
    /// Provider hotel identifier, unique within one search result set.
    HotelCode
}

define_string_id! {
    /// Fixed short location code understood by the hotel provider.
    CityCode
}

define_string_id! {
    /// Auth provider user identifier (UUID string).
    UserId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hotel_code_serializes_transparently() {
        let code = HotelCode::from("MCLONGHM");
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, r#""MCLONGHM""#);
        let back: HotelCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);
    }

    #[test]
    fn display_shows_inner() {
        assert_eq!(CityCode::from("PAR").to_string(), "PAR");
    }

    #[test]
    fn into_inner_returns_string() {
        let id = UserId::new("b7e1".to_owned());
        assert_eq!(id.as_inner(), "b7e1");
        assert_eq!(id.into_inner(), "b7e1");
    }
}
