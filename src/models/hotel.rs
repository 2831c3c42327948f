//! Normalized hotel record produced from provider offers.

use serde::{Deserialize, Serialize};

use super::{CityCode, HotelCode};

/// Display name used when the provider omits a hotel name.
pub const DEFAULT_HOTEL_NAME: &str = "Hotel";

/// Currency used when an offer carries no price block.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Rate used when an offer carries no price block.
pub const DEFAULT_MIN_RATE: &str = "0";

/// A hotel as shown in results, cards, and comparisons.
///
/// Every field has a concrete default so a renderer never has to handle
/// missing data. Instances are built once per search response and not
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    /// Provider hotel identifier.
    pub code: HotelCode,
    /// Hotel name.
    pub name: String,
    /// Provider city code the hotel belongs to.
    #[serde(default)]
    pub city_code: Option<CityCode>,
    /// Latitude, when the provider reports one.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Longitude, when the provider reports one.
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Star rating; `0` means unknown.
    pub rating: u32,
    /// Display category label, e.g. `"4 Stars"`.
    pub category_name: String,
    /// `true` when `category_name` is the fixed fallback label rather than
    /// a label derived from `rating`.
    #[serde(default)]
    pub category_is_fallback: bool,
    /// First address line, possibly empty.
    #[serde(default)]
    pub address: String,
    /// City display name, possibly empty.
    #[serde(default)]
    pub city: String,
    /// Lowest known stay price as a decimal string.
    pub min_rate: String,
    /// ISO currency code of `min_rate`.
    pub currency: String,
    /// At most one room summary taken from the best offer.
    #[serde(default)]
    pub rooms: Vec<RoomSummary>,
    /// Amenity labels, passed through from the provider.
    #[serde(default)]
    pub amenities: Vec<String>,
    /// Free-text description, possibly empty.
    #[serde(default)]
    pub description: String,
}

impl Hotel {
    /// Parses `min_rate` as a number.
    ///
    /// Returns `None` when the stored rate is not a decimal number.
    #[inline]
    #[must_use]
    pub fn price(&self) -> Option<f64> {
        self.min_rate.trim().parse::<f64>().ok().filter(|p| p.is_finite())
    }

    /// Returns `true` when the rating is in the displayable 1–5 range.
    #[inline]
    #[must_use]
    pub const fn has_stars(&self) -> bool {
        matches!(self.rating, 1..=5)
    }

    /// Star glyphs for the rating, empty outside the 1–5 range.
    #[inline]
    #[must_use]
    pub fn stars(&self) -> String {
        if self.has_stars() {
            "\u{2605}".repeat(usize::try_from(self.rating).unwrap_or_default())
        } else {
            String::new()
        }
    }

    /// Board name of the first rate of the first room.
    #[inline]
    #[must_use]
    pub fn board_name(&self) -> &str {
        self.rooms
            .first()
            .and_then(|room| room.rates.first())
            .map_or(crate::normalize::DEFAULT_BOARD_NAME, |rate| {
                rate.board_name.as_str()
            })
    }
}

/// Summary of the single room option kept per hotel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    /// Provider room type code.
    pub code: String,
    /// Room display name.
    pub name: String,
    /// Rates for this room; exactly one under the best-rate-only policy.
    pub rates: Vec<RoomRate>,
}

/// A priced rate attached to a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRate {
    /// Net price as a decimal string.
    pub net: String,
    /// Provider board code, e.g. `BREAKFAST`.
    pub board_code: String,
    /// Display meal-plan label.
    pub board_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotel_with(rating: u32, min_rate: &str) -> Hotel {
        Hotel {
            code: HotelCode::from("H1"),
            name: "Test".to_owned(),
            city_code: None,
            latitude: None,
            longitude: None,
            rating,
            category_name: format!("{rating} Stars"),
            category_is_fallback: false,
            address: String::new(),
            city: String::new(),
            min_rate: min_rate.to_owned(),
            currency: DEFAULT_CURRENCY.to_owned(),
            rooms: Vec::new(),
            amenities: Vec::new(),
            description: String::new(),
        }
    }

    #[test]
    fn price_parses_decimal_string() {
        assert_eq!(hotel_with(3, "120.50").price(), Some(120.5));
        assert_eq!(hotel_with(3, "n/a").price(), None);
    }

    #[test]
    fn stars_only_for_one_to_five() {
        assert_eq!(hotel_with(4, "0").stars(), "\u{2605}".repeat(4));
        assert!(hotel_with(0, "0").stars().is_empty());
        assert!(hotel_with(7, "0").stars().is_empty());
    }

    #[test]
    fn board_name_defaults_to_room_only() {
        assert_eq!(hotel_with(3, "0").board_name(), "Room Only");
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(hotel_with(5, "99")).unwrap();
        assert_eq!(json["minRate"], "99");
        assert_eq!(json["categoryName"], "5 Stars");
        assert_eq!(json["categoryIsFallback"], false);
    }

    #[test]
    fn deserializes_minimal_persisted_record() {
        let json = r#"{
            "code": "H9",
            "name": "Old",
            "rating": 2,
            "categoryName": "2 Stars",
            "minRate": "10",
            "currency": "EUR"
        }"#;
        let hotel: Hotel = serde_json::from_str(json).unwrap();
        assert!(hotel.rooms.is_empty());
        assert!(hotel.amenities.is_empty());
        assert_eq!(hotel.city, "");
    }
}
