//! Error types for the hotel comparison library.

use crate::city::EXAMPLE_DESTINATIONS;

/// All errors that can occur when searching, comparing, or administering.
#[derive(Debug, thiserror::Error)]
pub enum HotelError {
    /// HTTP transport failed for a reason other than connectivity.
    #[cfg(any(feature = "async", feature = "blocking"))]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A base URL or endpoint could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Storage backend failed.
    #[error("storage error: {0}")]
    Storage(Box<dyn core::error::Error + Send + Sync>),

    /// The token endpoint refused or failed to issue a credential.
    #[error("failed to authenticate with the hotel API: {message}")]
    AuthFailure {
        /// Detail reported by the token endpoint or transport.
        message: String,
    },

    /// The destination text did not match any known city.
    #[error("destination not found: {destination:?}")]
    DestinationNotFound {
        /// The text the user entered.
        destination: String,
    },

    /// The resolved market returned no candidate hotels.
    #[error("no hotels found for city code {city_code}")]
    NoHotelsInMarket {
        /// Provider city code that was queried.
        city_code: String,
    },

    /// The provider answered with a non-success status.
    #[error("provider error ({status}): {message}")]
    Provider {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the provider error body.
        message: String,
    },

    /// The request was sent but no response arrived.
    #[error("{message}")]
    Connectivity {
        /// Human-readable connectivity message.
        message: String,
    },

    /// A search filter field could not be interpreted.
    #[error("invalid value {value:?} for filter field {field}")]
    InvalidFilter {
        /// Name of the offending field.
        field: &'static str,
        /// Raw value that failed to parse.
        value: String,
    },

    /// Admin credentials or the stored admin session were rejected.
    #[error("Invalid admin credentials")]
    AdminUnauthorized,

    /// A required configuration value was not provided.
    #[error("missing configuration: {0}")]
    MissingConfiguration(&'static str),
}

impl HotelError {
    /// Renders the message shown to an end user in the error banner.
    #[inline]
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::DestinationNotFound { destination } => format!(
                "Destination \"{destination}\" was not recognised. Try: {}",
                EXAMPLE_DESTINATIONS.join(", ")
            ),
            Self::NoHotelsInMarket { city_code } => {
                format!("No hotels found in {city_code}. Try another destination.")
            }
            Self::AuthFailure { .. } => "Failed to authenticate with the hotel API".to_owned(),
            Self::Provider { message, .. } | Self::Connectivity { message } => message.clone(),
            Self::InvalidFilter { field, value } => {
                format!("Invalid value \"{value}\" for {field}")
            }
            Self::AdminUnauthorized => "Invalid admin credentials".to_owned(),
            #[cfg(any(feature = "async", feature = "blocking"))]
            Self::Http(err) => format!("Request error: {err}"),
            Self::Serialization(_)
            | Self::InvalidUrl(_)
            | Self::Storage(_)
            | Self::MissingConfiguration(_) => format!("Failed to fetch hotels: {self}"),
        }
    }
}

/// Convenience alias for results returned by this crate.
pub type Result<T> = core::result::Result<T, HotelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_from_serde_json() {
        let serde_err = serde_json::from_str::<String>("not json").unwrap_err();
        let err = HotelError::from(serde_err);
        assert!(matches!(err, HotelError::Serialization(_)));
        assert!(err.to_string().contains("serialization error"));
    }

    #[test]
    fn error_storage_display() {
        let inner = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err = HotelError::Storage(Box::new(inner));
        let msg = err.to_string();
        assert!(msg.contains("storage error"));
        assert!(msg.contains("file missing"));
    }

    #[test]
    fn destination_message_lists_examples() {
        let err = HotelError::DestinationNotFound {
            destination: "Atlantis".to_owned(),
        };
        let msg = err.user_message();
        assert!(msg.contains("Atlantis"));
        assert!(msg.contains("Paris"));
    }

    #[test]
    fn provider_message_is_passed_through() {
        let err = HotelError::Provider {
            status: 400,
            message: "Invalid date".to_owned(),
        };
        assert_eq!(err.user_message(), "Invalid date");
    }

    #[test]
    fn auth_failure_banner_hides_detail() {
        let err = HotelError::AuthFailure {
            message: "invalid_client".to_owned(),
        };
        assert_eq!(
            err.user_message(),
            "Failed to authenticate with the hotel API"
        );
        assert!(err.to_string().contains("invalid_client"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HotelError>();
    }
}
