//! HTTP client for the hotel provider API.
//!
//! Provides both async and blocking client variants behind feature flags.
//! Each client owns its [`TokenCache`](crate::token_cache::TokenCache) and
//! attaches a bearer credential to every data request; callers never see
//! the token.

use core::time::Duration;

use serde_json::Value;

use crate::error::HotelError;
use crate::models::{DATE_FORMAT, HotelCode};
use crate::search::StayDates;

/// Base URL for the provider's test environment.
const DEFAULT_BASE_URL: &str = "https://test.api.amadeus.com";

/// OAuth2 client-credentials token endpoint path.
const TOKEN_PATH: &str = "/v1/security/oauth2/token";

/// City → hotel-list endpoint path.
const HOTELS_BY_CITY_PATH: &str = "/v1/reference-data/locations/hotels/by-city";

/// Hotel-offers endpoint path.
const HOTEL_OFFERS_PATH: &str = "/v3/shopping/hotel-offers";

/// Search radius around the city centre, in kilometres.
const SEARCH_RADIUS_KM: u32 = 50;

/// Currency every price is requested in.
pub const REQUEST_CURRENCY: &str = "USD";

/// Offers are requested as the single best rate per hotel; each
/// normalized hotel models exactly one room option.
pub const BEST_RATE_ONLY: bool = true;

/// Adults assumed by single-hotel details requests.
const DETAILS_ADULTS: u32 = 2;

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Message used when a request was sent but no response arrived.
pub const CONNECTIVITY_MESSAGE: &str = "No response from hotel API. Please check your connection.";

/// Parameters of a batched hotel-offers request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferQuery {
    /// Hotels to price.
    pub hotel_ids: Vec<HotelCode>,
    /// Stay dates.
    pub stay: StayDates,
    /// Adult guests.
    pub adults: u32,
    /// Rooms requested.
    pub rooms: u32,
}

impl OfferQuery {
    /// Renders the query string parameters under the [`BEST_RATE_ONLY`]
    /// policy.
    fn params(&self) -> Vec<(&'static str, String)> {
        let ids: Vec<&str> = self.hotel_ids.iter().map(HotelCode::as_inner).collect();
        let mut params = stay_params(self.stay);
        params.insert(0, ("hotelIds", ids.join(",")));
        params.extend([
            ("adults", self.adults.to_string()),
            ("roomQuantity", self.rooms.to_string()),
            ("currency", REQUEST_CURRENCY.to_owned()),
            ("bestRateOnly", BEST_RATE_ONLY.to_string()),
        ]);
        params
    }
}

/// Query parameters for the city → hotel-list endpoint.
fn city_params(city_code: &str) -> [(&'static str, String); 4] {
    [
        ("cityCode", city_code.to_owned()),
        ("radius", SEARCH_RADIUS_KM.to_string()),
        ("radiusUnit", "KM".to_owned()),
        ("hotelSource", "ALL".to_owned()),
    ]
}

/// Query parameters for a single-hotel details request.
fn details_params(hotel_id: &HotelCode, stay: StayDates) -> Vec<(&'static str, String)> {
    let mut params = vec![("hotelIds", hotel_id.as_inner().to_owned())];
    params.extend(stay_params(stay));
    params.extend([
        ("adults", DETAILS_ADULTS.to_string()),
        ("currency", REQUEST_CURRENCY.to_owned()),
    ]);
    params
}

/// Check-in and check-out parameters.
fn stay_params(stay: StayDates) -> Vec<(&'static str, String)> {
    vec![
        ("checkInDate", stay.check_in.format(DATE_FORMAT).to_string()),
        ("checkOutDate", stay.check_out.format(DATE_FORMAT).to_string()),
    ]
}

/// Extracts a human-readable message from a provider error body.
///
/// Tries `errors[0].detail`, then `error_description`, then falls back to
/// a generic message carrying the status code.
#[inline]
#[must_use]
pub fn provider_error_message(status: u16, body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|value| {
            value
                .pointer("/errors/0/detail")
                .and_then(Value::as_str)
                .or_else(|| value.get("error_description").and_then(Value::as_str))
        })
        .filter(|message| !message.is_empty())
        .map_or_else(|| format!("API Error: {status}"), str::to_owned)
}

/// Maps a transport failure to the error taxonomy.
///
/// Connection failures and timeouts mean no response arrived.
pub(crate) fn transport_error(err: reqwest::Error) -> HotelError {
    if err.is_connect() || err.is_timeout() || err.is_request() {
        tracing::debug!(error = %err, "no response from provider");
        HotelError::Connectivity {
            message: CONNECTIVITY_MESSAGE.to_owned(),
        }
    } else {
        HotelError::Http(err)
    }
}

/// Wraps any token-endpoint failure as [`HotelError::AuthFailure`].
fn auth_failure<E: core::fmt::Display>(err: E) -> HotelError {
    HotelError::AuthFailure {
        message: err.to_string(),
    }
}

/// Generates a provider client (async or blocking) with builder, methods,
/// and tests.
macro_rules! define_client {
    (
        client_name: $client:ident,
        builder_name: $builder:ident,
        http_type: $http_type:ty,
        response_type: $resp_type:ty,
        client_doc: $client_doc:expr,
        builder_doc: $builder_doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
    ) => {
        #[doc = $builder_doc]
        #[derive(Debug)]
        pub struct $builder {
            /// OAuth2 client id.
            client_id: Option<String>,
            /// OAuth2 client secret.
            client_secret: Option<SecretString>,
            /// Base URL override (for testing).
            base_url: Option<String>,
            /// Pre-built token cache.
            tokens: Option<TokenCache>,
        }

        impl $builder {
            /// Sets the OAuth2 client credentials.
            #[inline]
            #[must_use]
            pub fn credentials<I: Into<String>, S: Into<String>>(
                mut self,
                client_id: I,
                client_secret: S,
            ) -> Self {
                self.client_id = Some(client_id.into());
                self.client_secret = Some(SecretString::from(client_secret.into()));
                self
            }

            /// Overrides the base URL (useful for testing with a mock server).
            #[inline]
            #[must_use]
            pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
                self.base_url = Some(url.into());
                self
            }

            /// Injects a token cache instead of starting empty.
            #[inline]
            #[must_use]
            pub fn token_cache(mut self, tokens: TokenCache) -> Self {
                self.tokens = Some(tokens);
                self
            }

            /// Builds the client.
            ///
            /// # Errors
            ///
            /// Returns [`HotelError::MissingConfiguration`] if credentials
            /// were not provided, [`HotelError::InvalidUrl`] if the base URL
            /// does not parse, and [`HotelError::Http`] if the HTTP client
            /// fails to build.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub fn build(self) -> Result<$client> {
                let client_id = self
                    .client_id
                    .ok_or(HotelError::MissingConfiguration("client_id"))?;
                let client_secret = self
                    .client_secret
                    .ok_or(HotelError::MissingConfiguration("client_secret"))?;
                let base_url = Url::parse(
                    self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL),
                )?;
                tracing::debug!(base_url = %base_url, "building hotel API client");
                let http = <$http_type>::builder().timeout(REQUEST_TIMEOUT).build()?;

                Ok($client {
                    http,
                    client_id,
                    client_secret,
                    base_url,
                    tokens: self.tokens.unwrap_or_default(),
                })
            }
        }

        #[doc = $client_doc]
        #[derive(Debug)]
        pub struct $client {
            /// Underlying HTTP client.
            http: $http_type,
            /// OAuth2 client id.
            client_id: String,
            /// OAuth2 client secret.
            client_secret: SecretString,
            /// API base URL.
            base_url: Url,
            /// Cached bearer credential.
            tokens: TokenCache,
        }

        impl $client {
            /// Creates a new builder for configuring the client.
            #[inline]
            #[must_use]
            pub const fn builder() -> $builder {
                $builder {
                    client_id: None,
                    client_secret: None,
                    base_url: None,
                    tokens: None,
                }
            }

            /// Returns a bearer credential, fetching a new one only when
            /// the cached one is absent or stale.
            ///
            /// # Errors
            ///
            /// Returns [`HotelError::AuthFailure`] if the token endpoint
            /// fails or refuses; nothing is cached in that case.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn access_token(&self) -> Result<SecretString> {
                if let Some(token) = self.tokens.valid_token(Utc::now())? {
                    tracing::trace!("reusing cached access token");
                    return Ok(token);
                }

                let url = self.base_url.join(TOKEN_PATH)?;
                tracing::debug!("requesting access token");
                let response: $resp_type = self
                    .http
                    .post(url)
                    .form(&[
                        ("grant_type", "client_credentials"),
                        ("client_id", self.client_id.as_str()),
                        ("client_secret", self.client_secret.expose_secret()),
                    ])
                    .send()
                    $( .$await_ext )?
                    .map_err(auth_failure)?;

                let status = response.status();
                let body = response.text() $( .$await_ext )? .map_err(auth_failure)?;
                if !status.is_success() {
                    tracing::warn!(status = status.as_u16(), "token request rejected");
                    return Err(HotelError::AuthFailure {
                        message: provider_error_message(status.as_u16(), &body),
                    });
                }

                let issued: TokenResponse = serde_json::from_str(&body).map_err(auth_failure)?;
                let token = AccessToken::from_response(issued, Utc::now());
                let secret = SecretString::from(token.secret().expose_secret().to_owned());
                self.tokens.store(token)?;
                Ok(secret)
            }

            /// Lists hotels located in a city via the hotel-list endpoint.
            ///
            /// # Errors
            ///
            /// Returns an error if authentication fails, the request gets no
            /// response, the provider answers with a non-success status, or
            /// the body cannot be deserialized.
            #[inline]
            #[tracing::instrument(skip_all, fields(city_code = %city_code))]
            pub $($async_kw)? fn hotels_by_city(
                &self,
                city_code: &CityCode,
            ) -> Result<Vec<HotelListEntry>> {
                let params = city_params(city_code.as_inner());
                let response: HotelListResponse =
                    self.get_json(HOTELS_BY_CITY_PATH, &params) $( .$await_ext )? ?;
                tracing::debug!(count = response.data.len(), "received hotel list");
                Ok(response.data)
            }

            /// Fetches offers for a batch of hotels in one call.
            ///
            /// # Errors
            ///
            /// Returns an error if authentication fails, the request gets no
            /// response, the provider answers with a non-success status, or
            /// the body cannot be deserialized.
            #[inline]
            #[tracing::instrument(skip_all, fields(hotels = query.hotel_ids.len()))]
            pub $($async_kw)? fn hotel_offers(
                &self,
                query: &OfferQuery,
            ) -> Result<Vec<RawHotelOffer>> {
                let response: HotelOffersResponse =
                    self.get_json(HOTEL_OFFERS_PATH, &query.params()) $( .$await_ext )? ?;
                let offers = response.data.unwrap_or_default();
                tracing::debug!(count = offers.len(), "received hotel offers");
                Ok(offers)
            }

            /// Fetches the offer record of a single hotel for two adults.
            ///
            /// Returns `Ok(None)` if the provider has no record for it.
            ///
            /// # Errors
            ///
            /// Returns an error if authentication fails, the request gets no
            /// response, the provider answers with a non-success status, or
            /// the body cannot be deserialized.
            #[inline]
            #[tracing::instrument(skip_all, fields(hotel_id = %hotel_id))]
            pub $($async_kw)? fn hotel_details(
                &self,
                hotel_id: &HotelCode,
                stay: StayDates,
            ) -> Result<Option<RawHotelOffer>> {
                let params = details_params(hotel_id, stay);
                let response: HotelOffersResponse =
                    self.get_json(HOTEL_OFFERS_PATH, &params) $( .$await_ext )? ?;
                Ok(response.data.unwrap_or_default().into_iter().next())
            }

            /// Sends an authenticated GET request and deserializes the
            /// response.
            #[tracing::instrument(skip_all, fields(path = %path))]
            $($async_kw)? fn get_json<Resp: serde::de::DeserializeOwned>(
                &self,
                path: &str,
                params: &[(&'static str, String)],
            ) -> Result<Resp> {
                let token = self.access_token() $( .$await_ext )? ?;
                let url = self.base_url.join(path)?;
                tracing::trace!(url = %url, "sending GET request");
                let response: $resp_type = self
                    .http
                    .get(url)
                    .bearer_auth(token.expose_secret())
                    .query(params)
                    .send()
                    $( .$await_ext )?
                    .map_err(transport_error)?;

                let status = response.status();
                tracing::debug!(status = %status, "received response");
                let body = response.text() $( .$await_ext )? .map_err(transport_error)?;
                if status.is_success() {
                    tracing::trace!(body_len = body.len(), "parsing response body");
                    serde_json::from_str(&body).map_err(HotelError::from)
                } else {
                    let message = provider_error_message(status.as_u16(), &body);
                    tracing::debug!(status = status.as_u16(), message = %message, "provider error");
                    Err(HotelError::Provider {
                        status: status.as_u16(),
                        message,
                    })
                }
            }
        }

    };
}

#[cfg(feature = "async")]
mod async_client {
    //! Async HTTP client for the hotel provider API.

    use chrono::Utc;
    use secrecy::{ExposeSecret as _, SecretString};
    use url::Url;

    use super::{
        DEFAULT_BASE_URL, HOTEL_OFFERS_PATH, HOTELS_BY_CITY_PATH, OfferQuery, REQUEST_TIMEOUT,
        TOKEN_PATH, auth_failure, city_params, details_params, provider_error_message,
        transport_error,
    };
    use crate::error::{HotelError, Result};
    use crate::models::{
        AccessToken, CityCode, HotelCode, HotelListEntry, HotelListResponse, HotelOffersResponse,
        RawHotelOffer, TokenResponse,
    };
    use crate::search::StayDates;
    use crate::token_cache::TokenCache;

    define_client! {
        client_name: HotelApiClient,
        builder_name: HotelApiClientBuilder,
        http_type: reqwest::Client,
        response_type: reqwest::Response,
        client_doc: "Async client for the hotel provider API.\n\nUse [`HotelApiClient::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`HotelApiClient`].",
        async_kw: async,
        await_kw: await,
    }
}

#[cfg(feature = "blocking")]
mod blocking_client {
    //! Blocking (synchronous) HTTP client for the hotel provider API.

    use chrono::Utc;
    use secrecy::{ExposeSecret as _, SecretString};
    use url::Url;

    use super::{
        DEFAULT_BASE_URL, HOTEL_OFFERS_PATH, HOTELS_BY_CITY_PATH, OfferQuery, REQUEST_TIMEOUT,
        TOKEN_PATH, auth_failure, city_params, details_params, provider_error_message,
        transport_error,
    };
    use crate::error::{HotelError, Result};
    use crate::models::{
        AccessToken, CityCode, HotelCode, HotelListEntry, HotelListResponse, HotelOffersResponse,
        RawHotelOffer, TokenResponse,
    };
    use crate::search::StayDates;
    use crate::token_cache::TokenCache;

    define_client! {
        client_name: HotelApiBlockingClient,
        builder_name: HotelApiBlockingClientBuilder,
        http_type: reqwest::blocking::Client,
        response_type: reqwest::blocking::Response,
        client_doc: "Blocking (synchronous) client for the hotel provider API.\n\nUse [`HotelApiBlockingClient::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`HotelApiBlockingClient`].",
    }
}

#[cfg(feature = "async")]
pub use async_client::{HotelApiClient, HotelApiClientBuilder};
#[cfg(feature = "blocking")]
pub use blocking_client::{HotelApiBlockingClient, HotelApiBlockingClientBuilder};


#[cfg(all(test, feature = "async"))]
mod mock_server_tests {
    use chrono::{NaiveDate, TimeDelta, Utc};
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::models::{AccessToken, CityCode};
    use crate::token_cache::TokenCache;

    async fn mount_token(server: &MockServer, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=my-id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "amadeusOAuth2Token",
                "access_token": "fresh-token",
                "token_type": "Bearer",
                "expires_in": 1799
            })))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    fn client_for(server: &MockServer) -> HotelApiClient {
        HotelApiClient::builder()
            .credentials("my-id", "my-secret")
            .base_url(server.uri())
            .build()
            .unwrap()
    }

    fn stay() -> StayDates {
        StayDates {
            check_in: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
        }
    }

    #[tokio::test]
    async fn token_fetched_once_and_reused() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("GET"))
            .and(path(HOTELS_BY_CITY_PATH))
            .and(query_param("cityCode", "PAR"))
            .and(query_param("radius", "50"))
            .and(header("authorization", "Bearer fresh-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"hotelId": "HP1", "name": "One"}, {"hotelId": "HP2"}]
            })))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let city = CityCode::from("PAR");
        let first = client.hotels_by_city(&city).await.unwrap();
        let second = client.hotels_by_city(&city).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn rejected_credentials_are_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "invalid_client",
                "error_description": "Client credentials are invalid"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.access_token().await.unwrap_err();
        assert!(matches!(
            err,
            HotelError::AuthFailure { ref message } if message == "Client credentials are invalid"
        ));
        // Nothing cached: the next call hits the endpoint again.
        assert!(client.access_token().await.is_err());
    }

    #[tokio::test]
    async fn offers_request_carries_all_parameters() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("GET"))
            .and(path(HOTEL_OFFERS_PATH))
            .and(query_param("hotelIds", "HP1,HP2"))
            .and(query_param("checkInDate", "2025-06-01"))
            .and(query_param("checkOutDate", "2025-06-03"))
            .and(query_param("adults", "2"))
            .and(query_param("roomQuantity", "1"))
            .and(query_param("currency", "USD"))
            .and(query_param("bestRateOnly", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"hotel": {"hotelId": "HP1", "name": "One"}, "offers": []}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let offers = client
            .hotel_offers(&OfferQuery {
                hotel_ids: vec![HotelCode::from("HP1"), HotelCode::from("HP2")],
                stay: stay(),
                adults: 2,
                rooms: 1,
            })
            .await
            .unwrap();
        assert_eq!(offers.len(), 1);
    }

    #[tokio::test]
    async fn provider_error_detail_is_surfaced() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("GET"))
            .and(path(HOTEL_OFFERS_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "errors": [{"code": 425, "detail": "CHECK-IN DATE IN THE PAST"}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .hotel_details(&HotelCode::from("HP1"), stay())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HotelError::Provider { status: 400, ref message } if message == "CHECK-IN DATE IN THE PAST"
        ));
    }

    #[tokio::test]
    async fn details_missing_record_is_none() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("GET"))
            .and(path(HOTEL_OFFERS_PATH))
            .and(query_param("hotelIds", "GONE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let details = client
            .hotel_details(&HotelCode::from("GONE"), stay())
            .await
            .unwrap();
        assert!(details.is_none());
    }

    #[tokio::test]
    async fn unreachable_provider_is_connectivity_error() {
        let tokens = TokenCache::new();
        tokens
            .store(AccessToken::new(
                SecretString::from("seeded".to_owned()),
                Utc::now() + TimeDelta::hours(1),
            ))
            .unwrap();
        let client = HotelApiClient::builder()
            .credentials("id", "secret")
            .base_url("http://127.0.0.1:9")
            .token_cache(tokens)
            .build()
            .unwrap();

        let err = client
            .hotels_by_city(&CityCode::from("PAR"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HotelError::Connectivity { ref message } if message == CONNECTIVITY_MESSAGE
        ));
    }
}
