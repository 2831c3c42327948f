//! Bearer-token cache for the hotel provider.
//!
//! The cache only answers "is there a reusable token right now?" and
//! accepts freshly issued tokens; fetching is the client's job. Two rapid
//! callers that both miss may each fetch a token, and the later store
//! wins.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret as _, SecretString};

use crate::error::{HotelError, Result};
use crate::models::AccessToken;

/// Holds at most one access token and its reuse deadline.
#[derive(Debug, Default)]
pub struct TokenCache {
    /// Current token, if any.
    slot: Mutex<Option<AccessToken>>,
}

impl TokenCache {
    /// Creates an empty cache.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the cached credential if it is still valid at
    /// `now`.
    ///
    /// # Errors
    ///
    /// Returns [`HotelError::Storage`] if the cache lock is poisoned.
    #[inline]
    pub fn valid_token(&self, now: DateTime<Utc>) -> Result<Option<SecretString>> {
        let slot = self.slot.lock().map_err(|err| lock_error(&err))?;
        Ok(slot
            .as_ref()
            .filter(|token| token.is_valid_at(now))
            .map(|token| SecretString::from(token.secret().expose_secret().to_owned())))
    }

    /// Replaces the cached token.
    ///
    /// # Errors
    ///
    /// Returns [`HotelError::Storage`] if the cache lock is poisoned.
    #[inline]
    pub fn store(&self, token: AccessToken) -> Result<()> {
        let mut slot = self.slot.lock().map_err(|err| lock_error(&err))?;
        tracing::debug!(expires_at = %token.expires_at(), "caching access token");
        *slot = Some(token);
        Ok(())
    }

    /// Drops the cached token so the next call fetches a new one.
    ///
    /// # Errors
    ///
    /// Returns [`HotelError::Storage`] if the cache lock is poisoned.
    #[inline]
    pub fn invalidate(&self) -> Result<()> {
        let mut slot = self.slot.lock().map_err(|err| lock_error(&err))?;
        *slot = None;
        Ok(())
    }
}

/// Wraps a mutex poison error.
fn lock_error<T>(err: &PoisonError<T>) -> HotelError {
    HotelError::Storage(err.to_string().into())
}
