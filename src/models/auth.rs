//! Auth-provider users and sessions.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::UserId;

/// A registered end user as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Unique identifier.
    pub id: UserId,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Registration timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last sign-in timestamp.
    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,
    /// Email confirmation timestamp; `None` while pending.
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
}

impl AuthUser {
    /// Returns `true` once the user has confirmed their email.
    #[inline]
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        self.email_confirmed_at.is_some()
    }
}

/// A signed-in user session.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserSession {
    /// Bearer credential for auth-provider calls.
    #[serde(
        serialize_with = "serialize_secret",
        deserialize_with = "deserialize_secret"
    )]
    pub access_token: SecretString,
    /// Credential used to renew the session.
    #[serde(
        default,
        serialize_with = "serialize_optional_secret",
        deserialize_with = "deserialize_optional_secret"
    )]
    pub refresh_token: Option<SecretString>,
    /// Lifetime in seconds at issue time.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Absolute expiry as seconds since the epoch.
    #[serde(default)]
    pub expires_at: Option<i64>,
    /// The signed-in user.
    pub user: AuthUser,
}

impl UserSession {
    /// Returns `true` while the session has not passed its expiry.
    ///
    /// Sessions without an expiry are treated as live.
    #[inline]
    #[must_use]
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|deadline| now.timestamp() < deadline)
    }
}

/// Response of the sign-up endpoint: a full session when the provider
/// auto-confirms, otherwise just the pending user.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SignUpResponse {
    /// Auto-confirmed sign-up.
    Session(UserSession),
    /// Sign-up awaiting email confirmation.
    Pending(AuthUser),
}

impl SignUpResponse {
    /// Returns the registered user.
    #[inline]
    #[must_use]
    pub const fn user(&self) -> &AuthUser {
        match self {
            Self::Session(session) => &session.user,
            Self::Pending(user) => user,
        }
    }
}

/// Response of the admin user-listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserListResponse {
    /// All registered users.
    #[serde(default)]
    pub users: Vec<AuthUser>,
}

/// Marker persisted after a successful admin sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    /// Admin email.
    pub email: String,
    /// Role claim.
    pub role: String,
    /// Sign-in instant.
    pub login_time: DateTime<Utc>,
}

/// Serializes a secret as a plain string.
fn serialize_secret<S: Serializer>(
    secret: &SecretString,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Deserializes a plain string into a secret.
fn deserialize_secret<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

/// Serializes an optional secret as an optional plain string.
#[allow(
    clippy::ref_option,
    reason = "serde serialize_with hands over a reference to the field"
)]
fn serialize_optional_secret<S: Serializer>(
    secret: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret.as_ref() {
        Some(value) => serializer.serialize_some(value.expose_secret()),
        None => serializer.serialize_none(),
    }
}

/// Deserializes an optional plain string into an optional secret.
fn deserialize_optional_secret<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<SecretString>, D::Error> {
    Option::<String>::deserialize(deserializer).map(|value| value.map(SecretString::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret as _;

    const SESSION_JSON: &str = r#"{
        "access_token": "jwt-token",
        "token_type": "bearer",
        "expires_in": 3600,
        "expires_at": 1700003600,
        "refresh_token": "refresh",
        "user": {
            "id": "8d0fd2b3-9ca7-4a8d-b6b8-0d7a1f2e4b11",
            "email": "traveller@example.com",
            "created_at": "2024-01-02T03:04:05.123456Z",
            "email_confirmed_at": "2024-01-02T03:10:00Z"
        }
    }"#;

    #[test]
    fn deserialize_session() {
        let session: UserSession = serde_json::from_str(SESSION_JSON).unwrap();
        assert_eq!(session.access_token.expose_secret(), "jwt-token");
        assert_eq!(session.user.email.as_deref(), Some("traveller@example.com"));
        assert!(session.user.is_verified());
        assert!(session.user.last_sign_in_at.is_none());
    }

    #[test]
    fn session_survives_serialization() {
        let session: UserSession = serde_json::from_str(SESSION_JSON).unwrap();
        let json = serde_json::to_string(&session).unwrap();
        let back: UserSession = serde_json::from_str(&json).unwrap();
        assert_eq!(back.access_token.expose_secret(), "jwt-token");
        assert_eq!(
            back.refresh_token.as_ref().map(|t| t.expose_secret().to_owned()),
            Some("refresh".to_owned())
        );
        assert_eq!(back.user, session.user);
    }

    #[test]
    fn session_liveness() {
        let session: UserSession = serde_json::from_str(SESSION_JSON).unwrap();
        assert!(session.is_live_at(DateTime::from_timestamp(1_700_000_000, 0).unwrap()));
        assert!(!session.is_live_at(DateTime::from_timestamp(1_700_003_600, 0).unwrap()));
    }

    #[test]
    fn sign_up_pending_user() {
        let json = r#"{"id": "u-1", "email": "new@example.com"}"#;
        let resp: SignUpResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(resp, SignUpResponse::Pending(_)));
        assert_eq!(resp.user().email.as_deref(), Some("new@example.com"));
    }

    #[test]
    fn sign_up_confirmed_session() {
        let resp: SignUpResponse = serde_json::from_str(SESSION_JSON).unwrap();
        assert!(matches!(resp, SignUpResponse::Session(_)));
    }

    #[test]
    fn admin_session_uses_camel_case() {
        let session = AdminSession {
            email: "admin@support.com".to_owned(),
            role: "admin".to_owned(),
            login_time: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        };
        let json = serde_json::to_value(&session).unwrap();
        assert!(json.get("loginTime").is_some());
    }
}
