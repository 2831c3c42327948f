//! Admin panel: sign-in gate, user directory, and delete confirmation.

use core::cmp::Reverse;

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::{ExposeSecret as _, SecretString};

use crate::error::{HotelError, Result};
use crate::models::{AdminSession, AuthUser, UserId};
use crate::storage::{ADMIN_SESSION_KEY, Storage, read_json, write_json};

/// Role recorded in an admin session.
pub const ADMIN_ROLE: &str = "admin";

/// How long an armed delete waits for its confirming second request.
pub const DELETE_CONFIRM_WINDOW: TimeDelta = TimeDelta::seconds(3);

/// Decides who may act as an administrator.
pub trait AuthorizationPolicy: core::fmt::Debug + Send + Sync {
    /// Returns `true` if the credentials belong to an administrator.
    fn verify_credentials(&self, email: &str, password: &SecretString) -> bool;

    /// Returns `true` if a persisted session still grants admin access.
    fn authorizes(&self, session: &AdminSession) -> bool;
}

/// Single hard-coded administrator account.
///
/// A placeholder trust model: anyone who can read this source knows the
/// password, and anyone who can write local storage can forge a session.
/// Unfit for any real deployment.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticAdminPolicy;

impl StaticAdminPolicy {
    /// The only accepted admin email.
    pub const EMAIL: &'static str = "admin@support.com";

    /// The only accepted admin password.
    const PASSWORD: &'static str = "Hello@123";
}

impl AuthorizationPolicy for StaticAdminPolicy {
    #[inline]
    fn verify_credentials(&self, email: &str, password: &SecretString) -> bool {
        email == Self::EMAIL && password.expose_secret() == Self::PASSWORD
    }

    #[inline]
    fn authorizes(&self, session: &AdminSession) -> bool {
        session.email == Self::EMAIL && session.role == ADMIN_ROLE
    }
}

/// Admin sign-in state backed by the `adminSession` storage key.
#[derive(Debug)]
pub struct AdminGate<S: Storage, P: AuthorizationPolicy> {
    /// Persistence backend.
    storage: S,
    /// Credential and session check.
    policy: P,
}

impl<S: Storage, P: AuthorizationPolicy> AdminGate<S, P> {
    /// Creates a gate over `storage` using `policy`.
    #[inline]
    pub const fn new(storage: S, policy: P) -> Self {
        Self { storage, policy }
    }

    /// Signs in and persists the admin session.
    ///
    /// # Errors
    ///
    /// Returns [`HotelError::AdminUnauthorized`] if the policy rejects the
    /// credentials, or a storage error if persisting fails.
    #[inline]
    pub fn login(
        &self,
        email: &str,
        password: &SecretString,
        now: DateTime<Utc>,
    ) -> Result<AdminSession> {
        if !self.policy.verify_credentials(email, password) {
            tracing::warn!("rejected admin sign-in");
            return Err(HotelError::AdminUnauthorized);
        }
        let session = AdminSession {
            email: email.to_owned(),
            role: ADMIN_ROLE.to_owned(),
            login_time: now,
        };
        write_json(&self.storage, ADMIN_SESSION_KEY, &session)?;
        tracing::info!("admin signed in");
        Ok(session)
    }

    /// Removes the admin session.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    #[inline]
    pub fn logout(&self) -> Result<()> {
        self.storage.remove(ADMIN_SESSION_KEY)
    }

    /// Returns the stored session if the policy still accepts it.
    ///
    /// Missing, malformed, and rejected sessions all yield `None`.
    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<AdminSession> {
        let session: AdminSession = read_json(&self.storage, ADMIN_SESSION_KEY)?;
        self.policy.authorizes(&session).then_some(session)
    }

    /// Returns the stored session or [`HotelError::AdminUnauthorized`].
    ///
    /// # Errors
    ///
    /// Returns [`HotelError::AdminUnauthorized`] when no authorized session
    /// exists.
    #[inline]
    pub fn require(&self) -> Result<AdminSession> {
        self.current().ok_or(HotelError::AdminUnauthorized)
    }
}

/// Counts shown under the user table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectoryStats {
    /// All users.
    pub total: usize,
    /// Users with a confirmed email.
    pub verified: usize,
    /// Users awaiting confirmation.
    pub pending: usize,
}

/// Registered users, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDirectory {
    /// Users sorted by `created_at`, descending; unknown dates last.
    users: Vec<AuthUser>,
}

impl UserDirectory {
    /// Sorts `users` newest first.
    #[inline]
    #[must_use]
    pub fn new(mut users: Vec<AuthUser>) -> Self {
        users.sort_by_key(|user| Reverse(user.created_at));
        Self { users }
    }

    /// All users.
    #[inline]
    #[must_use]
    pub fn users(&self) -> &[AuthUser] {
        &self.users
    }

    /// Users whose email or id contains `term`, ignoring case.
    ///
    /// An empty term matches everyone.
    #[inline]
    #[must_use]
    pub fn search(&self, term: &str) -> Vec<&AuthUser> {
        let needle = term.to_lowercase();
        self.users
            .iter()
            .filter(|user| {
                user.email
                    .as_deref()
                    .is_some_and(|email| email.to_lowercase().contains(&needle))
                    || user.id.as_inner().to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Total, verified, and pending counts.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> DirectoryStats {
        let verified = self.users.iter().filter(|user| user.is_verified()).count();
        DirectoryStats {
            total: self.users.len(),
            verified,
            pending: self.users.len().saturating_sub(verified),
        }
    }

    /// Drops a deleted user locally. Returns `true` if it was present.
    #[inline]
    pub fn remove(&mut self, id: &UserId) -> bool {
        let before = self.users.len();
        self.users.retain(|user| &user.id != id);
        self.users.len() < before
    }
}

/// Outcome of a delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteStep {
    /// First request: confirmation armed for this user.
    Armed(UserId),
    /// Second request inside the window: go ahead and delete.
    Confirmed(UserId),
}

/// Two-step delete: the first request arms, a repeat for the same user
/// within [`DELETE_CONFIRM_WINDOW`] confirms.
///
/// Requests for another user, or after the window lapsed, re-arm.
#[derive(Debug, Clone)]
pub struct DeleteConfirmation {
    /// Armed user and when it was armed.
    armed: Option<(UserId, DateTime<Utc>)>,
    /// Confirmation window.
    window: TimeDelta,
}

impl Default for DeleteConfirmation {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl DeleteConfirmation {
    /// Creates an unarmed confirmation with the default window.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::with_window(DELETE_CONFIRM_WINDOW)
    }

    /// Creates an unarmed confirmation with a custom window.
    #[inline]
    #[must_use]
    pub const fn with_window(window: TimeDelta) -> Self {
        Self {
            armed: None,
            window,
        }
    }

    /// Registers a delete request for `id` at `now`.
    #[inline]
    pub fn request(&mut self, id: &UserId, now: DateTime<Utc>) -> DeleteStep {
        if self.pending(now) == Some(id) {
            self.armed = None;
            return DeleteStep::Confirmed(id.clone());
        }
        self.armed = Some((id.clone(), now));
        DeleteStep::Armed(id.clone())
    }

    /// User awaiting confirmation at `now`, if the window is still open.
    #[inline]
    #[must_use]
    pub fn pending(&self, now: DateTime<Utc>) -> Option<&UserId> {
        self.armed
            .as_ref()
            .filter(|&&(_, armed_at)| now.signed_duration_since(armed_at) < self.window)
            .map(|(id, _)| id)
    }

    /// Disarms any pending confirmation.
    #[inline]
    pub fn reset(&mut self) {
        self.armed = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_owned())
    }

    fn user(id: &str, email: &str, created: Option<i64>, verified: bool) -> AuthUser {
        AuthUser {
            id: UserId::from(id),
            email: Some(email.to_owned()),
            created_at: created.map(at),
            last_sign_in_at: None,
            email_confirmed_at: verified.then(|| at(0)),
        }
    }

    #[test]
    fn static_policy_accepts_only_the_literal_account() {
        let policy = StaticAdminPolicy;
        assert!(policy.verify_credentials("admin@support.com", &secret("Hello@123")));
        assert!(!policy.verify_credentials("admin@support.com", &secret("hello@123")));
        assert!(!policy.verify_credentials("someone@support.com", &secret("Hello@123")));
    }

    #[test]
    fn login_persists_session() {
        let storage = InMemoryStorage::new();
        let gate = AdminGate::new(&storage, StaticAdminPolicy);
        assert!(gate.current().is_none());
        let session = gate
            .login("admin@support.com", &secret("Hello@123"), at(0))
            .unwrap();
        assert_eq!(session.role, "admin");
        assert_eq!(gate.current(), Some(session));
        let raw = storage.get(ADMIN_SESSION_KEY).unwrap().unwrap();
        assert!(raw.contains("loginTime"));
    }

    #[test]
    fn bad_credentials_rejected() {
        let storage = InMemoryStorage::new();
        let gate = AdminGate::new(&storage, StaticAdminPolicy);
        let err = gate
            .login("admin@support.com", &secret("wrong"), at(0))
            .unwrap_err();
        assert!(matches!(err, HotelError::AdminUnauthorized));
        assert!(storage.is_empty().unwrap());
    }

    #[test]
    fn forged_session_is_not_authorized() {
        let storage = InMemoryStorage::new();
        let forged = AdminSession {
            email: "intruder@example.com".to_owned(),
            role: ADMIN_ROLE.to_owned(),
            login_time: at(0),
        };
        write_json(&storage, ADMIN_SESSION_KEY, &forged).unwrap();
        let gate = AdminGate::new(&storage, StaticAdminPolicy);
        assert!(gate.current().is_none());
        assert!(matches!(gate.require(), Err(HotelError::AdminUnauthorized)));
    }

    #[test]
    fn logout_clears_session() {
        let storage = InMemoryStorage::new();
        let gate = AdminGate::new(&storage, StaticAdminPolicy);
        let _session = gate
            .login("admin@support.com", &secret("Hello@123"), at(0))
            .unwrap();
        gate.logout().unwrap();
        assert!(gate.current().is_none());
    }

    #[test]
    fn directory_sorts_newest_first() {
        let dir = UserDirectory::new(vec![
            user("a", "old@example.com", Some(10), true),
            user("b", "undated@example.com", None, false),
            user("c", "new@example.com", Some(20), false),
        ]);
        let ids: Vec<&str> = dir.users().iter().map(|u| u.id.as_inner()).collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }

    #[test]
    fn directory_search_ignores_case() {
        let dir = UserDirectory::new(vec![
            user("ABC-1", "Alice@Example.com", Some(1), true),
            user("def-2", "bob@example.com", Some(2), false),
        ]);
        assert_eq!(dir.search("alice").len(), 1);
        assert_eq!(dir.search("abc").len(), 1);
        assert_eq!(dir.search("EXAMPLE").len(), 2);
        assert_eq!(dir.search("").len(), 2);
        assert!(dir.search("zzz").is_empty());
    }

    #[test]
    fn directory_search_matches_id_fragment() {
        let id = uuid::Uuid::new_v4().to_string();
        let dir = UserDirectory::new(vec![
            user(&id, "x@example.com", Some(1), true),
            user("other", "y@example.com", Some(2), true),
        ]);
        let fragment = id.get(..8).unwrap().to_uppercase();
        let found = dir.search(&fragment);
        assert_eq!(found.len(), 1);
        assert_eq!(found.first().unwrap().id.as_inner(), id);
    }

    #[test]
    fn directory_stats_and_remove() {
        let mut dir = UserDirectory::new(vec![
            user("a", "a@example.com", Some(1), true),
            user("b", "b@example.com", Some(2), false),
            user("c", "c@example.com", Some(3), true),
        ]);
        assert_eq!(
            dir.stats(),
            DirectoryStats {
                total: 3,
                verified: 2,
                pending: 1
            }
        );
        assert!(dir.remove(&UserId::from("b")));
        assert!(!dir.remove(&UserId::from("b")));
        assert_eq!(dir.stats().pending, 0);
    }

    #[test]
    fn second_request_within_window_confirms() {
        let mut confirm = DeleteConfirmation::new();
        let id = UserId::from("u-1");
        assert_eq!(confirm.request(&id, at(0)), DeleteStep::Armed(id.clone()));
        assert_eq!(confirm.pending(at(1)), Some(&id));
        assert_eq!(confirm.request(&id, at(2)), DeleteStep::Confirmed(id.clone()));
        assert!(confirm.pending(at(2)).is_none());
    }

    #[test]
    fn expired_confirmation_rearms() {
        let mut confirm = DeleteConfirmation::new();
        let id = UserId::from("u-1");
        let _armed = confirm.request(&id, at(0));
        assert!(confirm.pending(at(3)).is_none());
        assert_eq!(confirm.request(&id, at(3)), DeleteStep::Armed(id.clone()));
    }

    #[test]
    fn other_user_rearms() {
        let mut confirm = DeleteConfirmation::new();
        let first = UserId::from("u-1");
        let second = UserId::from("u-2");
        let _armed = confirm.request(&first, at(0));
        assert_eq!(confirm.request(&second, at(1)), DeleteStep::Armed(second.clone()));
        assert_eq!(confirm.request(&first, at(1)), DeleteStep::Armed(first));
        confirm.reset();
        assert!(confirm.pending(at(1)).is_none());
    }
}
