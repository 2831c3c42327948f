//! Data models for hotels, search filters, provider payloads, and auth.
//!
//! Normalized types ([`Hotel`], [`SearchFilters`]) are what the rest of the
//! crate works with; the `Raw*` types mirror the provider's JSON and only
//! flow into [`crate::normalize`].

mod auth;
mod filters;
mod hotel;
mod ids;
mod offer;
mod token;

pub use auth::{AdminSession, AuthUser, SignUpResponse, UserListResponse, UserSession};
pub use chrono::NaiveDate;
pub use filters::{DATE_FORMAT, FilterUpdate, SearchFilters};
pub use hotel::{
    DEFAULT_CURRENCY, DEFAULT_HOTEL_NAME, DEFAULT_MIN_RATE, Hotel, RoomRate, RoomSummary,
};
pub use ids::{CityCode, HotelCode, UserId};
pub use offer::{
    HotelListEntry, HotelListResponse, HotelOffersResponse, RawAddress, RawHotel, RawHotelOffer,
    RawOffer, RawPrice, RawRating, RawRoom, RawRoomEstimate, RawText,
};
pub use token::{AccessToken, TOKEN_SAFETY_MARGIN_SECS, TokenResponse};
