//! OAuth2 client-credentials token models.

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::SecretString;
use serde::Deserialize;

/// Seconds subtracted from the provider's TTL before a token is
/// considered stale.
pub const TOKEN_SAFETY_MARGIN_SECS: i64 = 300;

/// Raw token endpoint response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    /// Bearer credential.
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: i64,
    /// Token type, normally `Bearer`.
    #[serde(default)]
    pub token_type: Option<String>,
}

/// A bearer credential with the instant after which it must not be reused.
#[derive(Debug)]
pub struct AccessToken {
    /// The bearer credential.
    token: SecretString,
    /// Reuse deadline (issue time + TTL − safety margin).
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Creates a token that may be reused until `expires_at`.
    #[inline]
    #[must_use]
    pub const fn new(token: SecretString, expires_at: DateTime<Utc>) -> Self {
        Self { token, expires_at }
    }

    /// Builds a token from an endpoint response received at `issued_at`,
    /// applying [`TOKEN_SAFETY_MARGIN_SECS`].
    #[inline]
    #[must_use]
    pub fn from_response(response: TokenResponse, issued_at: DateTime<Utc>) -> Self {
        let usable_secs = response.expires_in.saturating_sub(TOKEN_SAFETY_MARGIN_SECS);
        let expires_at = TimeDelta::try_seconds(usable_secs)
            .and_then(|ttl| issued_at.checked_add_signed(ttl))
            .unwrap_or(issued_at);
        Self {
            token: SecretString::from(response.access_token),
            expires_at,
        }
    }

    /// Returns the bearer credential.
    #[inline]
    #[must_use]
    pub const fn secret(&self) -> &SecretString {
        &self.token
    }

    /// Returns the reuse deadline.
    #[inline]
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns `true` while the token may still be attached to requests.
    #[inline]
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(expires_in: i64) -> TokenResponse {
        TokenResponse {
            access_token: "abc".to_owned(),
            expires_in,
            token_type: Some("Bearer".to_owned()),
        }
    }

    #[test]
    fn expiry_subtracts_safety_margin() {
        let issued = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let token = AccessToken::from_response(response(1799), issued);
        assert_eq!(token.expires_at().timestamp(), 1_700_000_000 + 1799 - 300);
    }

    #[test]
    fn validity_window() {
        let issued = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let token = AccessToken::from_response(response(1800), issued);
        let before = DateTime::from_timestamp(1_700_001_499, 0).unwrap();
        let at = DateTime::from_timestamp(1_700_001_500, 0).unwrap();
        assert!(token.is_valid_at(before));
        assert!(!token.is_valid_at(at));
    }

    #[test]
    fn short_ttl_is_immediately_stale() {
        let issued = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let token = AccessToken::from_response(response(120), issued);
        assert!(!token.is_valid_at(issued));
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let issued = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let token = AccessToken::from_response(response(1800), issued);
        assert!(!format!("{token:?}").contains("abc"));
    }

    #[test]
    fn deserialize_token_response() {
        let json = r#"{"type":"amadeusOAuth2Token","access_token":"tok","expires_in":1799,"token_type":"Bearer"}"#;
        let resp: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.access_token, "tok");
        assert_eq!(resp.expires_in, 1799);
    }
}
