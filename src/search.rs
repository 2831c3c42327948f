//! Search pipeline: filters in, normalized and filtered hotels out.
//!
//! Every step depends on the previous one succeeding:
//!
//! 1. interpret the filter form (dates default to tomorrow / tomorrow + 2),
//! 2. resolve the destination, failing on unknown text,
//! 3. list up to [`MAX_CANDIDATE_HOTELS`] hotels in the city,
//! 4. price them in one batched offers call,
//! 5. normalize every record,
//! 6. apply the rating and price filters.
//!
//! There are no retries; a failed step ends the search.

use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{HotelError, Result};
use crate::models::{DATE_FORMAT, Hotel, SearchFilters};

/// Maximum number of candidate hotels priced per search.
pub const MAX_CANDIDATE_HOTELS: usize = 50;

/// Upper price bound used when only a lower bound is given.
pub const DEFAULT_MAX_PRICE: f64 = 999_999.0;

/// Adults assumed when the field is empty or zero.
const DEFAULT_ADULTS: u32 = 2;

/// Rooms assumed when the field is empty or zero.
const DEFAULT_ROOMS: u32 = 1;

/// Concrete check-in and check-out dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StayDates {
    /// Arrival date.
    pub check_in: NaiveDate,
    /// Departure date.
    pub check_out: NaiveDate,
}

impl StayDates {
    /// Default stay relative to `today`: arrive tomorrow, leave two days
    /// later.
    #[inline]
    #[must_use]
    pub fn default_for(today: NaiveDate) -> Self {
        let check_in = today.checked_add_days(Days::new(1)).unwrap_or(today);
        let check_out = today.checked_add_days(Days::new(3)).unwrap_or(check_in);
        Self {
            check_in,
            check_out,
        }
    }

    /// Resolves form text into dates, defaulting each empty side
    /// independently.
    ///
    /// Reversed dates are accepted as-is.
    ///
    /// # Errors
    ///
    /// Returns [`HotelError::InvalidFilter`] if a non-empty value is not a
    /// `YYYY-MM-DD` date.
    #[inline]
    pub fn resolve(check_in: &str, check_out: &str, today: NaiveDate) -> Result<Self> {
        let defaults = Self::default_for(today);
        Ok(Self {
            check_in: parse_date("checkIn", check_in)?.unwrap_or(defaults.check_in),
            check_out: parse_date("checkOut", check_out)?.unwrap_or(defaults.check_out),
        })
    }
}

/// Inclusive price band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBand {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl PriceBand {
    /// Returns `true` when `price` lies within the band.
    #[inline]
    #[must_use]
    pub fn contains(&self, price: f64) -> bool {
        self.min <= price && price <= self.max
    }
}

/// Filter form interpreted into typed search parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCriteria {
    /// Destination text as entered.
    pub destination: String,
    /// Stay dates.
    pub stay: StayDates,
    /// Adult guests.
    pub adults: u32,
    /// Rooms requested.
    pub rooms: u32,
    /// Minimum star rating, inclusive.
    pub min_rating: Option<u32>,
    /// Price band; `None` when neither bound is set.
    pub price_band: Option<PriceBand>,
}

impl SearchCriteria {
    /// Interprets a filter form.
    ///
    /// # Errors
    ///
    /// Returns [`HotelError::InvalidFilter`] for any non-empty field that
    /// does not parse.
    #[inline]
    pub fn from_filters(filters: &SearchFilters, today: NaiveDate) -> Result<Self> {
        let stay = StayDates::resolve(&filters.check_in, &filters.check_out, today)?;
        let min_price = parse_price("minPrice", &filters.min_price)?;
        let max_price = parse_price("maxPrice", &filters.max_price)?;
        let price_band = (min_price.is_some() || max_price.is_some()).then(|| PriceBand {
            min: min_price.unwrap_or(0.0_f64),
            max: max_price.unwrap_or(DEFAULT_MAX_PRICE),
        });
        Ok(Self {
            destination: filters.destination.trim().to_owned(),
            stay,
            adults: parse_positive("adults", &filters.adults)?.unwrap_or(DEFAULT_ADULTS),
            rooms: parse_positive("rooms", &filters.rooms)?.unwrap_or(DEFAULT_ROOMS),
            min_rating: parse_rating(&filters.rating)?,
            price_band,
        })
    }

    /// Returns `true` when `hotel` passes the rating and price filters.
    ///
    /// A hotel whose rate does not parse fails any active price band.
    #[inline]
    #[must_use]
    pub fn accepts(&self, hotel: &Hotel) -> bool {
        let rating_ok = self.min_rating.is_none_or(|min| hotel.rating >= min);
        let price_ok = self
            .price_band
            .is_none_or(|band| hotel.price().is_some_and(|price| band.contains(price)));
        rating_ok && price_ok
    }
}

/// Applies the rating filter, then the price filter.
#[inline]
#[must_use]
pub fn apply_filters(hotels: Vec<Hotel>, criteria: &SearchCriteria) -> Vec<Hotel> {
    let before = hotels.len();
    let kept: Vec<Hotel> = hotels
        .into_iter()
        .filter(|hotel| criteria.accepts(hotel))
        .collect();
    tracing::debug!(before, after = kept.len(), "applied search filters");
    kept
}

/// Outcome of a successful search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    /// Hotels that passed every filter.
    pub hotels: Vec<Hotel>,
    /// Resolved arrival date.
    pub check_in: NaiveDate,
    /// Resolved departure date.
    pub check_out: NaiveDate,
    /// Number of hotels returned.
    pub total: usize,
}

impl SearchResults {
    /// Wraps a filtered hotel list with its stay dates.
    #[inline]
    #[must_use]
    pub fn new(hotels: Vec<Hotel>, stay: StayDates) -> Self {
        Self {
            total: hotels.len(),
            hotels,
            check_in: stay.check_in,
            check_out: stay.check_out,
        }
    }

    /// An empty result set.
    #[inline]
    #[must_use]
    pub fn empty(stay: StayDates) -> Self {
        Self::new(Vec::new(), stay)
    }
}

/// The current local date.
#[inline]
#[must_use]
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses an optional `YYYY-MM-DD` field.
fn parse_date(field: &'static str, raw: &str) -> Result<Option<NaiveDate>> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(Some)
        .map_err(|_parse| invalid(field, raw))
}

/// Parses an optional count; zero counts as unset.
fn parse_positive(field: &'static str, raw: &str) -> Result<Option<u32>> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<u32>()
        .map(|count| (count > 0).then_some(count))
        .map_err(|_parse| invalid(field, raw))
}

/// Parses an optional minimum rating, dropping any fractional part.
fn parse_rating(raw: &str) -> Result<Option<u32>> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(None);
    }
    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    if !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("rating", raw));
    }
    whole
        .parse()
        .map(Some)
        .map_err(|_parse| invalid("rating", raw))
}

/// Parses an optional non-negative decimal field.
fn parse_price(field: &'static str, raw: &str) -> Result<Option<f64>> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price >= 0.0_f64)
        .map(Some)
        .ok_or_else(|| invalid(field, raw))
}

/// Builds an [`HotelError::InvalidFilter`].
fn invalid(field: &'static str, raw: &str) -> HotelError {
    HotelError::InvalidFilter {
        field,
        value: raw.to_owned(),
    }
}

/// Generates a search orchestrator (async or blocking) over the matching
/// provider client.
#[cfg(any(feature = "async", feature = "blocking"))]
macro_rules! define_search {
    (
        search_name: $search:ident,
        builder_name: $builder:ident,
        client_type: $client_ty:ty,
        search_doc: $search_doc:expr,
        builder_doc: $builder_doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
    ) => {
        #[doc = $builder_doc]
        #[derive(Debug)]
        pub struct $builder {
            /// Provider client.
            client: Option<$client_ty>,
            /// City resolver; the built-in table when unset.
            resolver: Option<CityResolver>,
        }

        impl $builder {
            /// Sets the provider client.
            #[inline]
            #[must_use]
            pub fn client(mut self, client: $client_ty) -> Self {
                self.client = Some(client);
                self
            }

            /// Sets the city resolver.
            #[inline]
            #[must_use]
            pub fn resolver(mut self, resolver: CityResolver) -> Self {
                self.resolver = Some(resolver);
                self
            }

            /// Builds the orchestrator.
            ///
            /// # Errors
            ///
            /// Returns [`HotelError::MissingConfiguration`] if no client was
            /// provided.
            #[inline]
            pub fn build(self) -> Result<$search> {
                let client = self
                    .client
                    .ok_or(HotelError::MissingConfiguration("client"))?;
                Ok($search {
                    client,
                    resolver: self.resolver.unwrap_or_default(),
                })
            }
        }

        #[doc = $search_doc]
        #[derive(Debug)]
        pub struct $search {
            /// Provider client.
            client: $client_ty,
            /// Destination resolver.
            resolver: CityResolver,
        }

        impl $search {
            /// Creates a new builder.
            #[inline]
            #[must_use]
            pub const fn builder() -> $builder {
                $builder {
                    client: None,
                    resolver: None,
                }
            }

            /// Returns the provider client.
            #[inline]
            #[must_use]
            pub const fn client(&self) -> &$client_ty {
                &self.client
            }

            /// Returns the city resolver.
            #[inline]
            #[must_use]
            pub const fn resolver(&self) -> &CityResolver {
                &self.resolver
            }

            /// Runs a search with dates defaulted relative to the local
            /// date.
            ///
            /// # Errors
            ///
            /// See [`Self::search_on`].
            #[inline]
            pub $($async_kw)? fn search(&self, filters: &SearchFilters) -> Result<SearchResults> {
                self.search_on(filters, local_today()) $( .$await_ext )?
            }

            /// Runs a search with dates defaulted relative to `today`.
            ///
            /// # Errors
            ///
            /// Returns [`HotelError::InvalidFilter`] for unparsable form
            /// fields, [`HotelError::DestinationNotFound`] for unknown
            /// destinations, [`HotelError::NoHotelsInMarket`] when the city
            /// has no hotels, and any client error from the network steps.
            #[inline]
            #[tracing::instrument(skip_all, fields(destination = %filters.destination))]
            pub $($async_kw)? fn search_on(
                &self,
                filters: &SearchFilters,
                today: NaiveDate,
            ) -> Result<SearchResults> {
                let criteria = SearchCriteria::from_filters(filters, today)?;
                let city_code = self.resolver.resolve(&criteria.destination).ok_or_else(|| {
                    HotelError::DestinationNotFound {
                        destination: criteria.destination.clone(),
                    }
                })?;
                tracing::debug!(city_code = %city_code, "resolved destination");

                let candidates = self.client.hotels_by_city(&city_code) $( .$await_ext )? ?;
                if candidates.is_empty() {
                    tracing::warn!(city_code = %city_code, "no hotels in market");
                    return Err(HotelError::NoHotelsInMarket {
                        city_code: city_code.into_inner(),
                    });
                }
                let hotel_ids: Vec<HotelCode> = candidates
                    .into_iter()
                    .take(MAX_CANDIDATE_HOTELS)
                    .map(|entry| entry.hotel_id)
                    .collect();

                let query = OfferQuery {
                    hotel_ids,
                    stay: criteria.stay,
                    adults: criteria.adults,
                    rooms: criteria.rooms,
                };
                let records = self.client.hotel_offers(&query) $( .$await_ext )? ?;

                let ctx = SearchContext {
                    destination: &criteria.destination,
                    city_code: &city_code,
                };
                let hotels: Vec<Hotel> = records
                    .into_iter()
                    .map(|record| normalize(record, ctx))
                    .collect();
                let hotels = apply_filters(hotels, &criteria);
                tracing::debug!(total = hotels.len(), "search complete");
                Ok(SearchResults::new(hotels, criteria.stay))
            }
        }
    };
}

#[cfg(feature = "async")]
mod async_search {
    //! Async search orchestrator.

    use chrono::NaiveDate;

    use super::{MAX_CANDIDATE_HOTELS, SearchCriteria, SearchResults, apply_filters, local_today};
    use crate::city::CityResolver;
    use crate::client::{HotelApiClient, OfferQuery};
    use crate::error::{HotelError, Result};
    use crate::models::{Hotel, HotelCode, SearchFilters};
    use crate::normalize::{SearchContext, normalize};

    define_search! {
        search_name: HotelSearch,
        builder_name: HotelSearchBuilder,
        client_type: HotelApiClient,
        search_doc: "Async search pipeline over a [`HotelApiClient`].\n\nUse [`HotelSearch::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`HotelSearch`].",
        async_kw: async,
        await_kw: await,
    }
}

#[cfg(feature = "blocking")]
mod blocking_search {
    //! Blocking search orchestrator.

    use chrono::NaiveDate;

    use super::{MAX_CANDIDATE_HOTELS, SearchCriteria, SearchResults, apply_filters, local_today};
    use crate::city::CityResolver;
    use crate::client::{HotelApiBlockingClient, OfferQuery};
    use crate::error::{HotelError, Result};
    use crate::models::{Hotel, HotelCode, SearchFilters};
    use crate::normalize::{SearchContext, normalize};

    define_search! {
        search_name: HotelSearchBlocking,
        builder_name: HotelSearchBlockingBuilder,
        client_type: HotelApiBlockingClient,
        search_doc: "Blocking search pipeline over a [`HotelApiBlockingClient`].\n\nUse [`HotelSearchBlocking::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`HotelSearchBlocking`].",
    }
}

#[cfg(feature = "async")]
pub use async_search::{HotelSearch, HotelSearchBuilder};
#[cfg(feature = "blocking")]
pub use blocking_search::{HotelSearchBlocking, HotelSearchBlockingBuilder};
