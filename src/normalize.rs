//! Offer normalization: raw provider records into [`Hotel`]s.
//!
//! Only the first offer of each record is kept. The provider is queried in
//! best-rate-only mode, so that offer is the cheapest one and further room
//! options are not modelled.

use crate::models::{
    CityCode, DEFAULT_CURRENCY, DEFAULT_HOTEL_NAME, DEFAULT_MIN_RATE, Hotel, RawHotel,
    RawHotelOffer, RawOffer, RawRating, RoomRate, RoomSummary,
};

/// Board name used for unknown or absent board codes.
pub const DEFAULT_BOARD_NAME: &str = "Room Only";

/// Board code assumed when an offer carries none.
pub const DEFAULT_BOARD_CODE: &str = "ROOM_ONLY";

/// Room type code assumed when an offer carries none.
pub const DEFAULT_ROOM_CODE: &str = "STANDARD";

/// Room name assumed when an offer carries no estimated category.
pub const DEFAULT_ROOM_NAME: &str = "Standard Room";

/// Category label shown when the rating is unknown.
pub const FALLBACK_CATEGORY_NAME: &str = "3 Stars";

/// Provider board code → display name.
const BOARD_NAMES: &[(&str, &str)] = &[
    ("ROOM_ONLY", "Room Only"),
    ("BREAKFAST", "Bed and Breakfast"),
    ("HALF_BOARD", "Half Board"),
    ("FULL_BOARD", "Full Board"),
    ("ALL_INCLUSIVE", "All Inclusive"),
];

/// Context a record is normalized against.
#[derive(Debug, Clone, Copy)]
pub struct SearchContext<'ctx> {
    /// Destination text as the user typed it.
    pub destination: &'ctx str,
    /// City code the destination resolved to.
    pub city_code: &'ctx CityCode,
}

/// Resolves a board code to its display name.
///
/// Unknown and absent codes map to [`DEFAULT_BOARD_NAME`].
#[inline]
#[must_use]
pub fn board_name(code: Option<&str>) -> &'static str {
    code.and_then(|wanted| {
        BOARD_NAMES
            .iter()
            .find(|&&(known, _)| known == wanted)
            .map(|&(_, name)| name)
    })
    .unwrap_or(DEFAULT_BOARD_NAME)
}

/// Derives the star rating of a provider hotel.
///
/// A direct rating wins; otherwise the first digit run of the category
/// code is used; otherwise the rating is `0` (unknown).
#[inline]
#[must_use]
pub fn derive_rating(hotel: &RawHotel) -> u32 {
    hotel
        .rating
        .as_ref()
        .and_then(rating_value)
        .or_else(|| hotel.category_code.as_deref().and_then(first_digit_run))
        .unwrap_or(0_u32)
}

/// Returns the category label and whether it is the fixed fallback.
#[inline]
#[must_use]
pub fn category_name(rating: u32) -> (String, bool) {
    if rating > 0 {
        (format!("{rating} Stars"), false)
    } else {
        (FALLBACK_CATEGORY_NAME.to_owned(), true)
    }
}

/// Normalizes one provider record into a [`Hotel`].
///
/// Total over partial input: every absent field gets its documented
/// default.
#[inline]
#[must_use]
pub fn normalize(record: RawHotelOffer, ctx: SearchContext<'_>) -> Hotel {
    let RawHotelOffer { hotel, offers, .. } = record;
    let offer = offers.into_iter().next();

    let rating = derive_rating(&hotel);
    let (category_name, category_is_fallback) = category_name(rating);

    let price = offer.as_ref().and_then(|o| o.price.as_ref());
    let min_rate = price
        .and_then(|p| non_empty(p.total.as_deref()))
        .unwrap_or(DEFAULT_MIN_RATE)
        .to_owned();
    let currency = price
        .and_then(|p| non_empty(p.currency.as_deref()))
        .unwrap_or(DEFAULT_CURRENCY)
        .to_owned();

    let address = hotel
        .address
        .as_ref()
        .and_then(|a| non_empty(a.lines.first().map(String::as_str)))
        .unwrap_or_default()
        .to_owned();
    let city = hotel
        .address
        .as_ref()
        .and_then(|a| non_empty(a.city_name.as_deref()))
        .or_else(|| non_empty(Some(ctx.destination.trim())))
        .unwrap_or_else(|| ctx.city_code.as_inner())
        .to_owned();

    let description = offer
        .as_ref()
        .and_then(|o| o.room.as_ref())
        .and_then(|room| room.description.as_ref())
        .and_then(|text| non_empty(text.text()))
        .or_else(|| hotel.description.as_ref().and_then(|text| non_empty(text.text())))
        .unwrap_or_default()
        .to_owned();

    let rooms = offer.as_ref().map(room_summary).into_iter().collect();

    Hotel {
        name: non_empty(hotel.name.as_deref())
            .unwrap_or(DEFAULT_HOTEL_NAME)
            .to_owned(),
        code: hotel.hotel_id,
        city_code: hotel.city_code,
        latitude: hotel.latitude,
        longitude: hotel.longitude,
        rating,
        category_name,
        category_is_fallback,
        address,
        city,
        min_rate,
        currency,
        rooms,
        amenities: hotel.amenities.unwrap_or_default(),
        description,
    }
}

/// Builds the single room summary for an offer.
fn room_summary(offer: &RawOffer) -> RoomSummary {
    let room = offer.room.as_ref();
    let board_code = non_empty(offer.board_type.as_deref());
    RoomSummary {
        code: room
            .and_then(|r| non_empty(r.kind.as_deref()))
            .unwrap_or(DEFAULT_ROOM_CODE)
            .to_owned(),
        name: room
            .and_then(|r| r.type_estimated.as_ref())
            .and_then(|estimate| non_empty(estimate.category.as_deref()))
            .unwrap_or(DEFAULT_ROOM_NAME)
            .to_owned(),
        rates: vec![RoomRate {
            net: offer
                .price
                .as_ref()
                .and_then(|p| non_empty(p.total.as_deref()))
                .unwrap_or(DEFAULT_MIN_RATE)
                .to_owned(),
            board_code: board_code.unwrap_or(DEFAULT_BOARD_CODE).to_owned(),
            board_name: board_name(board_code).to_owned(),
        }],
    }
}

/// Interprets a direct rating as a whole number of stars.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is finite, non-negative, and truncated; `as` saturates"
)]
fn rating_value(rating: &RawRating) -> Option<u32> {
    match *rating {
        RawRating::Number(value) if value.is_finite() && value >= 0.0_f64 => {
            Some(value.trunc() as u32)
        }
        RawRating::Number(_) => None,
        RawRating::Text(ref text) => leading_integer(text),
    }
}

/// Parses the leading digits of `text` after trimming.
fn leading_integer(text: &str) -> Option<u32> {
    let digits: String = text
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Parses the first run of ASCII digits anywhere in `text`.
fn first_digit_run(text: &str) -> Option<u32> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Treats empty strings as absent.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
