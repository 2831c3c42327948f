//! Auth-provider client: end-user accounts and the admin user directory.
//!
//! Speaks the GoTrue-style REST dialect: every request carries an `apikey`
//! header; user-scoped calls add the session's bearer token. The admin
//! client authenticates with the service-role key, which normal users
//! never see.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::models::UserSession;
use crate::storage::{Storage, USER_SESSION_KEY, read_json, write_json};

/// Sign-up endpoint path.
const SIGN_UP_PATH: &str = "/auth/v1/signup";

/// Password sign-in endpoint path (with `grant_type=password`).
const TOKEN_PATH: &str = "/auth/v1/token";

/// Sign-out endpoint path.
const LOGOUT_PATH: &str = "/auth/v1/logout";

/// Current-user endpoint path.
const USER_PATH: &str = "/auth/v1/user";

/// Admin user-directory endpoint path.
const ADMIN_USERS_PATH: &str = "/auth/v1/admin/users";

/// Header carrying the project API key.
const API_KEY_HEADER: &str = "apikey";

/// Email/password request body.
#[derive(Serialize)]
struct Credentials<'req> {
    /// Account email.
    email: &'req str,
    /// Account password.
    password: &'req str,
}

/// Extracts a human-readable message from an auth-provider error body.
///
/// Tries `error_description`, `msg`, `message`, then `error`.
#[inline]
#[must_use]
pub fn auth_error_message(status: u16, body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|value| {
            ["error_description", "msg", "message", "error"]
                .into_iter()
                .find_map(|key| value.get(key).and_then(Value::as_str))
        })
        .filter(|message| !message.is_empty())
        .map_or_else(|| format!("Auth error: {status}"), str::to_owned)
}

/// Returns the persisted user session, if any.
///
/// Malformed values are logged and treated as signed out.
#[inline]
pub fn stored_session<S: Storage + ?Sized>(storage: &S) -> Option<UserSession> {
    read_json(storage, USER_SESSION_KEY)
}

/// Persists the user session.
///
/// # Errors
///
/// Returns an error if serialization or the storage write fails.
#[inline]
pub fn store_session<S: Storage + ?Sized>(storage: &S, session: &UserSession) -> Result<()> {
    write_json(storage, USER_SESSION_KEY, session)
}

/// Removes the persisted user session.
///
/// # Errors
///
/// Returns an error if the storage backend fails.
#[inline]
pub fn forget_session<S: Storage + ?Sized>(storage: &S) -> Result<()> {
    storage.remove(USER_SESSION_KEY)
}

/// Generates the end-user and admin auth clients (async or blocking)
/// with a shared builder.
#[cfg(any(feature = "async", feature = "blocking"))]
macro_rules! define_auth_client {
    (
        client_name: $client:ident,
        admin_name: $admin:ident,
        builder_name: $builder:ident,
        http_type: $http_type:ty,
        request_type: $req_type:ty,
        response_type: $resp_type:ty,
        client_doc: $client_doc:expr,
        admin_doc: $admin_doc:expr,
        builder_doc: $builder_doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
    ) => {
        #[doc = $builder_doc]
        #[derive(Debug, Default)]
        pub struct $builder {
            /// Auth provider base URL.
            base_url: Option<String>,
            /// Public (anonymous) API key.
            anon_key: Option<SecretString>,
            /// Privileged service-role key.
            service_role_key: Option<SecretString>,
        }

        impl $builder {
            /// Sets the auth provider base URL.
            #[inline]
            #[must_use]
            pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
                self.base_url = Some(url.into());
                self
            }

            /// Sets the public API key used by end-user calls.
            #[inline]
            #[must_use]
            pub fn anon_key<T: Into<String>>(mut self, key: T) -> Self {
                self.anon_key = Some(SecretString::from(key.into()));
                self
            }

            /// Sets the service-role key used by admin calls.
            #[inline]
            #[must_use]
            pub fn service_role_key<T: Into<String>>(mut self, key: T) -> Self {
                self.service_role_key = Some(SecretString::from(key.into()));
                self
            }

            /// Builds the end-user client.
            ///
            /// # Errors
            ///
            /// Returns [`HotelError::MissingConfiguration`] if the base URL
            /// or anon key is missing, [`HotelError::InvalidUrl`] if the base
            /// URL does not parse, and [`HotelError::Http`] if the HTTP
            /// client fails to build.
            #[inline]
            pub fn build(self) -> Result<$client> {
                let key = self
                    .anon_key
                    .ok_or(HotelError::MissingConfiguration("anon_key"))?;
                let (http, base_url) = connect(self.base_url.as_deref())?;
                Ok($client { http, base_url, key })
            }

            /// Builds the admin client.
            ///
            /// # Errors
            ///
            /// Returns [`HotelError::MissingConfiguration`] if the base URL
            /// or service-role key is missing, [`HotelError::InvalidUrl`] if
            /// the base URL does not parse, and [`HotelError::Http`] if the
            /// HTTP client fails to build.
            #[inline]
            pub fn build_admin(self) -> Result<$admin> {
                let key = self
                    .service_role_key
                    .ok_or(HotelError::MissingConfiguration("service_role_key"))?;
                let (http, base_url) = connect(self.base_url.as_deref())?;
                Ok($admin { http, base_url, key })
            }
        }

        /// Parses the base URL and builds the HTTP client.
        fn connect(base_url: Option<&str>) -> Result<($http_type, Url)> {
            let raw = base_url.ok_or(HotelError::MissingConfiguration("auth_url"))?;
            let url = Url::parse(raw)?;
            tracing::debug!(base_url = %url, "building auth client");
            let http = <$http_type>::builder().build()?;
            Ok((http, url))
        }

        /// Sends a request and returns the body of a success response.
        $($async_kw)? fn send(request: $req_type) -> Result<String> {
            let response: $resp_type = request.send() $( .$await_ext )? .map_err(transport_error)?;
            let status = response.status();
            let body = response.text() $( .$await_ext )? ?;
            tracing::debug!(status = %status, "auth provider responded");
            if status.is_success() {
                Ok(body)
            } else {
                Err(HotelError::Provider {
                    status: status.as_u16(),
                    message: auth_error_message(status.as_u16(), &body),
                })
            }
        }

        #[doc = $client_doc]
        #[derive(Debug)]
        pub struct $client {
            /// Underlying HTTP client.
            http: $http_type,
            /// Auth provider base URL.
            base_url: Url,
            /// Public API key.
            key: SecretString,
        }

        impl $client {
            /// Creates a new builder.
            #[inline]
            #[must_use]
            pub fn builder() -> $builder {
                $builder::default()
            }

            /// Registers a new account.
            ///
            /// # Errors
            ///
            /// Returns [`HotelError::Provider`] if the provider rejects the
            /// sign-up, or a transport/deserialization error.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn sign_up(
                &self,
                email: &str,
                password: &SecretString,
            ) -> Result<SignUpResponse> {
                let url = self.base_url.join(SIGN_UP_PATH)?;
                let body = Credentials { email, password: password.expose_secret() };
                let request = self.http.post(url)
                    .header(API_KEY_HEADER, self.key.expose_secret())
                    .json(&body);
                let text = send(request) $( .$await_ext )? ?;
                serde_json::from_str(&text).map_err(HotelError::from)
            }

            /// Signs in with email and password.
            ///
            /// # Errors
            ///
            /// Returns [`HotelError::Provider`] for rejected credentials, or
            /// a transport/deserialization error.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn sign_in(
                &self,
                email: &str,
                password: &SecretString,
            ) -> Result<UserSession> {
                let url = self.base_url.join(TOKEN_PATH)?;
                let body = Credentials { email, password: password.expose_secret() };
                let request = self.http.post(url)
                    .query(&[("grant_type", "password")])
                    .header(API_KEY_HEADER, self.key.expose_secret())
                    .json(&body);
                let text = send(request) $( .$await_ext )? ?;
                serde_json::from_str(&text).map_err(HotelError::from)
            }

            /// Revokes the session on the provider.
            ///
            /// # Errors
            ///
            /// Returns [`HotelError::Provider`] if the provider refuses, or a
            /// transport error.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn sign_out(&self, session: &UserSession) -> Result<()> {
                let url = self.base_url.join(LOGOUT_PATH)?;
                let request = self.http.post(url)
                    .header(API_KEY_HEADER, self.key.expose_secret())
                    .bearer_auth(session.access_token.expose_secret());
                let _body = send(request) $( .$await_ext )? ?;
                Ok(())
            }

            /// Fetches the user behind a session.
            ///
            /// # Errors
            ///
            /// Returns [`HotelError::Provider`] if the session is no longer
            /// valid, or a transport/deserialization error.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn current_user(&self, session: &UserSession) -> Result<AuthUser> {
                let url = self.base_url.join(USER_PATH)?;
                let request = self.http.get(url)
                    .header(API_KEY_HEADER, self.key.expose_secret())
                    .bearer_auth(session.access_token.expose_secret());
                let text = send(request) $( .$await_ext )? ?;
                serde_json::from_str(&text).map_err(HotelError::from)
            }
        }

        #[doc = $admin_doc]
        #[derive(Debug)]
        pub struct $admin {
            /// Underlying HTTP client.
            http: $http_type,
            /// Auth provider base URL.
            base_url: Url,
            /// Service-role key.
            key: SecretString,
        }

        impl $admin {
            /// Lists every registered user.
            ///
            /// # Errors
            ///
            /// Returns [`HotelError::Provider`] if the key is rejected, or a
            /// transport/deserialization error.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn list_users(&self) -> Result<Vec<AuthUser>> {
                let url = self.base_url.join(ADMIN_USERS_PATH)?;
                let request = self.http.get(url)
                    .header(API_KEY_HEADER, self.key.expose_secret())
                    .bearer_auth(self.key.expose_secret());
                let text = send(request) $( .$await_ext )? ?;
                let listed: UserListResponse = serde_json::from_str(&text)?;
                tracing::debug!(count = listed.users.len(), "listed users");
                Ok(listed.users)
            }

            /// Deletes a user by id.
            ///
            /// # Errors
            ///
            /// Returns [`HotelError::Provider`] if the key is rejected or the
            /// user does not exist, or a transport error.
            #[inline]
            #[tracing::instrument(skip_all, fields(user_id = %user_id))]
            pub $($async_kw)? fn delete_user(&self, user_id: &UserId) -> Result<()> {
                let url = self
                    .base_url
                    .join(&format!("{ADMIN_USERS_PATH}/{}", user_id.as_inner()))?;
                let request = self.http.delete(url)
                    .header(API_KEY_HEADER, self.key.expose_secret())
                    .bearer_auth(self.key.expose_secret());
                let _body = send(request) $( .$await_ext )? ?;
                tracing::debug!("deleted user");
                Ok(())
            }
        }

    };
}

#[cfg(feature = "async")]
mod async_auth {
    //! Async auth-provider clients.

    use secrecy::{ExposeSecret as _, SecretString};
    use url::Url;

    use super::{
        ADMIN_USERS_PATH, API_KEY_HEADER, Credentials, LOGOUT_PATH, SIGN_UP_PATH, TOKEN_PATH,
        USER_PATH, auth_error_message,
    };
    use crate::client::transport_error;
    use crate::error::{HotelError, Result};
    use crate::models::{AuthUser, SignUpResponse, UserId, UserListResponse, UserSession};

    define_auth_client! {
        client_name: AuthClient,
        admin_name: AuthAdminClient,
        builder_name: AuthClientBuilder,
        http_type: reqwest::Client,
        request_type: reqwest::RequestBuilder,
        response_type: reqwest::Response,
        client_doc: "Async end-user auth client.\n\nUse [`AuthClient::builder()`] to construct an instance.",
        admin_doc: "Async admin auth client, authenticated with the service-role key.\n\nBuilt with [`AuthClientBuilder::build_admin`].",
        builder_doc: "Builder for [`AuthClient`] and [`AuthAdminClient`].",
        async_kw: async,
        await_kw: await,
    }
}

#[cfg(feature = "blocking")]
mod blocking_auth {
    //! Blocking auth-provider clients.

    use secrecy::{ExposeSecret as _, SecretString};
    use url::Url;

    use super::{
        ADMIN_USERS_PATH, API_KEY_HEADER, Credentials, LOGOUT_PATH, SIGN_UP_PATH, TOKEN_PATH,
        USER_PATH, auth_error_message,
    };
    use crate::client::transport_error;
    use crate::error::{HotelError, Result};
    use crate::models::{AuthUser, SignUpResponse, UserId, UserListResponse, UserSession};

    define_auth_client! {
        client_name: AuthBlockingClient,
        admin_name: AuthAdminBlockingClient,
        builder_name: AuthBlockingClientBuilder,
        http_type: reqwest::blocking::Client,
        request_type: reqwest::blocking::RequestBuilder,
        response_type: reqwest::blocking::Response,
        client_doc: "Blocking end-user auth client.\n\nUse [`AuthBlockingClient::builder()`] to construct an instance.",
        admin_doc: "Blocking admin auth client, authenticated with the service-role key.\n\nBuilt with [`AuthBlockingClientBuilder::build_admin`].",
        builder_doc: "Builder for [`AuthBlockingClient`] and [`AuthAdminBlockingClient`].",
    }
}

#[cfg(feature = "async")]
pub use async_auth::{AuthAdminClient, AuthClient, AuthClientBuilder};
#[cfg(feature = "blocking")]
pub use blocking_auth::{AuthAdminBlockingClient, AuthBlockingClient, AuthBlockingClientBuilder};
