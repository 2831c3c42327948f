//! Screens and the guards in front of them.

use chrono::{DateTime, Utc};

use crate::admin::AuthorizationPolicy;
use crate::auth::stored_session;
use crate::models::AdminSession;
use crate::storage::{ADMIN_SESSION_KEY, Storage, read_json};

/// A navigable screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// End-user sign-in.
    Login,
    /// End-user registration.
    SignUp,
    /// Hotel search and comparison; needs a live user session.
    Hotels,
    /// Admin sign-in.
    AdminLogin,
    /// User directory; needs an authorized admin session.
    AdminDashboard,
}

impl Route {
    /// Maps a path to its screen. `/` and unknown paths land on
    /// [`Route::Hotels`].
    #[inline]
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/login" => Self::Login,
            "/signup" => Self::SignUp,
            "/admin/login" => Self::AdminLogin,
            "/admin/dashboard" => Self::AdminDashboard,
            _ => Self::Hotels,
        }
    }

    /// Canonical path of the screen.
    #[inline]
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::SignUp => "/signup",
            Self::Hotels => "/hotels",
            Self::AdminLogin => "/admin/login",
            Self::AdminDashboard => "/admin/dashboard",
        }
    }

    /// Where to send a visitor who fails this screen's guard, if it has one.
    #[inline]
    #[must_use]
    pub const fn fallback(self) -> Option<Self> {
        match self {
            Self::Hotels => Some(Self::Login),
            Self::AdminDashboard => Some(Self::AdminLogin),
            Self::Login | Self::SignUp | Self::AdminLogin => None,
        }
    }
}

impl core::fmt::Display for Route {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.path())
    }
}

/// Resolves the screen actually shown for `requested`.
///
/// [`Route::Hotels`] needs a user session that is live at `now`;
/// [`Route::AdminDashboard`] needs an admin session accepted by `policy`.
#[inline]
pub fn resolve<S, P>(requested: Route, storage: &S, policy: &P, now: DateTime<Utc>) -> Route
where
    S: Storage + ?Sized,
    P: AuthorizationPolicy + ?Sized,
{
    let allowed = match requested {
        Route::Hotels => stored_session(storage).is_some_and(|session| session.is_live_at(now)),
        Route::AdminDashboard => read_json::<AdminSession, _>(storage, ADMIN_SESSION_KEY)
            .is_some_and(|session| policy.authorizes(&session)),
        Route::Login | Route::SignUp | Route::AdminLogin => true,
    };
    match requested.fallback() {
        Some(fallback) if !allowed => {
            tracing::debug!(from = %requested, to = %fallback, "redirecting");
            fallback
        }
        Some(_) | None => requested,
    }
}
