//! Raw hotel-provider payloads.
//!
//! These mirror the provider's JSON loosely: almost every field is
//! optional, because the normalizer is responsible for defaults.

use serde::{Deserialize, Serialize};

use super::{CityCode, HotelCode};

/// Response of the city → hotel-list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HotelListResponse {
    /// Hotels located in the requested city.
    #[serde(default)]
    pub data: Vec<HotelListEntry>,
}

/// One hotel returned by the city → hotel-list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelListEntry {
    /// Provider hotel identifier.
    pub hotel_id: HotelCode,
    /// Hotel name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Response of the hotel-offers endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HotelOffersResponse {
    /// Offer records, one per hotel under best-rate-only.
    #[serde(default)]
    pub data: Option<Vec<RawHotelOffer>>,
}

/// A provider hotel together with its priced offers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawHotelOffer {
    /// Static hotel information.
    pub hotel: RawHotel,
    /// Whether the hotel has availability for the requested stay.
    #[serde(default)]
    pub available: Option<bool>,
    /// Priced offers; only the first is used.
    #[serde(default)]
    pub offers: Vec<RawOffer>,
}

/// Static hotel information inside an offer record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawHotel {
    /// Provider hotel identifier.
    pub hotel_id: HotelCode,
    /// Hotel name.
    #[serde(default)]
    pub name: Option<String>,
    /// Provider city code.
    #[serde(default)]
    pub city_code: Option<CityCode>,
    /// Latitude.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Longitude.
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Direct star rating; sent as a number or a numeric string.
    #[serde(default)]
    pub rating: Option<RawRating>,
    /// Category code such as `"4EST"`, used when no direct rating exists.
    #[serde(default, alias = "category")]
    pub category_code: Option<String>,
    /// Postal address.
    #[serde(default)]
    pub address: Option<RawAddress>,
    /// Amenity labels.
    #[serde(default)]
    pub amenities: Option<Vec<String>>,
    /// Hotel description.
    #[serde(default)]
    pub description: Option<RawText>,
}

/// A rating that the provider may encode as a number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRating {
    /// Numeric encoding.
    Number(f64),
    /// String encoding, e.g. `"4"`.
    Text(String),
}

/// Text the provider sends either plain or wrapped in an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawText {
    /// Plain string.
    Plain(String),
    /// Object with a `text` member.
    Rich {
        /// The text content.
        #[serde(default)]
        text: Option<String>,
    },
}

impl RawText {
    /// Returns the contained text, if any.
    #[inline]
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Plain(text) => Some(text.as_str()),
            Self::Rich { text } => text.as_deref(),
        }
    }
}

/// Postal address of a provider hotel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAddress {
    /// Street lines.
    #[serde(default)]
    pub lines: Vec<String>,
    /// City name.
    #[serde(default)]
    pub city_name: Option<String>,
    /// Postal code.
    #[serde(default)]
    pub postal_code: Option<String>,
    /// Country code.
    #[serde(default)]
    pub country_code: Option<String>,
}

/// One priced offer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOffer {
    /// Provider offer identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Room information.
    #[serde(default)]
    pub room: Option<RawRoom>,
    /// Board (meal plan) code.
    #[serde(default)]
    pub board_type: Option<String>,
    /// Price block.
    #[serde(default)]
    pub price: Option<RawPrice>,
}

/// Room information inside an offer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRoom {
    /// Room type code.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Estimated room classification.
    #[serde(default)]
    pub type_estimated: Option<RawRoomEstimate>,
    /// Room description.
    #[serde(default)]
    pub description: Option<RawText>,
}

/// Estimated room classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRoomEstimate {
    /// Category label, e.g. `STANDARD_ROOM`.
    #[serde(default)]
    pub category: Option<String>,
}

/// Price block of an offer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPrice {
    /// ISO currency code.
    #[serde(default)]
    pub currency: Option<String>,
    /// Total stay price as a decimal string.
    #[serde(default)]
    pub total: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_offer_record() {
        let json = r#"{
            "type": "hotel-offers",
            "hotel": {
                "hotelId": "HLPAR266",
                "name": "Hotel Lutetia",
                "cityCode": "PAR",
                "latitude": 48.85,
                "longitude": 2.32,
                "rating": "5",
                "address": {"lines": ["45 Bd Raspail"], "cityName": "PARIS"}
            },
            "available": true,
            "offers": [{
                "id": "O1",
                "room": {"type": "A1K", "typeEstimated": {"category": "DELUXE_ROOM"},
                         "description": {"text": "Deluxe king"}},
                "boardType": "BREAKFAST",
                "price": {"currency": "EUR", "total": "612.00"}
            }]
        }"#;
        let record: RawHotelOffer = serde_json::from_str(json).unwrap();
        assert_eq!(record.hotel.hotel_id, HotelCode::from("HLPAR266"));
        assert_eq!(record.hotel.rating, Some(RawRating::Text("5".to_owned())));
        assert_eq!(record.offers.len(), 1);
        let room = record.offers.first().and_then(|o| o.room.as_ref()).unwrap();
        assert_eq!(room.kind.as_deref(), Some("A1K"));
        assert_eq!(
            room.description.as_ref().and_then(RawText::text),
            Some("Deluxe king")
        );
    }

    #[test]
    fn deserialize_minimal_offer_record() {
        let json = r#"{"hotel": {"hotelId": "X"}}"#;
        let record: RawHotelOffer = serde_json::from_str(json).unwrap();
        assert!(record.offers.is_empty());
        assert!(record.hotel.name.is_none());
        assert!(record.hotel.rating.is_none());
    }

    #[test]
    fn numeric_rating_and_category_alias() {
        let json = r#"{"hotelId": "X", "rating": 4, "category": "3EST"}"#;
        let hotel: RawHotel = serde_json::from_str(json).unwrap();
        assert_eq!(hotel.rating, Some(RawRating::Number(4.0)));
        assert_eq!(hotel.category_code.as_deref(), Some("3EST"));
    }

    #[test]
    fn offers_response_without_data() {
        let resp: HotelOffersResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.data.is_none());
    }

    #[test]
    fn plain_description_text() {
        let text: RawText = serde_json::from_str(r#""Quiet rooms""#).unwrap();
        assert_eq!(text.text(), Some("Quiet rooms"));
    }
}
