//! Chart-ready aggregates over the selected hotels.
//!
//! Everything here is a pure function of the selection; nothing is
//! cached or persisted.

use crate::models::{DEFAULT_HOTEL_NAME, Hotel, HotelCode};

/// Charts are offered only from this many selected hotels upwards.
pub const MIN_HOTELS_FOR_CHARTS: usize = 2;

/// Longest chart label before truncation, in characters.
const LABEL_MAX_CHARS: usize = 20;

/// City shown when a hotel has none.
const UNKNOWN_CITY: &str = "Unknown";

/// Amenities shown per card.
const CARD_AMENITIES: usize = 2;

/// One comparison card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonCard {
    /// Hotel code, used for removal.
    pub code: HotelCode,
    /// Display name.
    pub name: String,
    /// City, or `"Unknown"`.
    pub city: String,
    /// Numeric rating.
    pub rating: u32,
    /// Star glyphs, empty outside 1–5.
    pub stars: String,
    /// Price with two decimals.
    pub price: String,
    /// Price currency.
    pub currency: String,
    /// Meal-plan label.
    pub board_name: String,
    /// First amenities, possibly empty.
    pub amenities: Vec<String>,
}

impl ComparisonCard {
    /// Builds the card for one hotel.
    #[inline]
    #[must_use]
    pub fn from_hotel(hotel: &Hotel) -> Self {
        Self {
            code: hotel.code.clone(),
            name: display_name(hotel).to_owned(),
            city: if hotel.city.is_empty() {
                UNKNOWN_CITY.to_owned()
            } else {
                hotel.city.clone()
            },
            rating: hotel.rating,
            stars: hotel.stars(),
            price: format!("{:.2}", hotel.price().unwrap_or_default()),
            currency: hotel.currency.clone(),
            board_name: hotel.board_name().to_owned(),
            amenities: hotel.amenities.iter().take(CARD_AMENITIES).cloned().collect(),
        }
    }
}

/// One bar of the price chart.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    /// Axis label, truncated with `"..."` past 20 characters.
    pub label: String,
    /// Untruncated name for tooltips.
    pub full_name: String,
    /// Numeric price; `0` when the rate does not parse.
    pub price: f64,
}

/// One slice of the rating histogram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingBucket {
    /// Label such as `"4 Stars"`.
    pub label: String,
    /// Hotels with that rating.
    pub count: usize,
}

/// All comparison aggregates for a selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonView {
    /// One card per hotel, in selection order.
    pub cards: Vec<ComparisonCard>,
    /// Price chart series, in selection order.
    pub price_series: Vec<PricePoint>,
    /// Rating histogram, buckets in first-seen order.
    pub rating_histogram: Vec<RatingBucket>,
}

impl ComparisonView {
    /// Computes the view for a selection.
    #[inline]
    #[must_use]
    pub fn from_hotels(hotels: &[Hotel]) -> Self {
        Self {
            cards: hotels.iter().map(ComparisonCard::from_hotel).collect(),
            price_series: price_series(hotels),
            rating_histogram: rating_histogram(hotels),
        }
    }

    /// `true` when enough hotels are selected to chart them.
    #[inline]
    #[must_use]
    pub fn charts_available(&self) -> bool {
        self.cards.len() >= MIN_HOTELS_FOR_CHARTS
    }

    /// `true` when the selection is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Price chart series in selection order.
#[inline]
#[must_use]
pub fn price_series(hotels: &[Hotel]) -> Vec<PricePoint> {
    hotels
        .iter()
        .map(|hotel| {
            let name = display_name(hotel);
            PricePoint {
                label: truncate_label(name),
                full_name: name.to_owned(),
                price: hotel.price().unwrap_or_default(),
            }
        })
        .collect()
}

/// Counts hotels per rating label, keeping first-seen order.
#[inline]
#[must_use]
pub fn rating_histogram(hotels: &[Hotel]) -> Vec<RatingBucket> {
    let mut buckets: Vec<RatingBucket> = Vec::new();
    for hotel in hotels {
        let label = format!("{} Stars", hotel.rating);
        match buckets.iter_mut().find(|bucket| bucket.label == label) {
            Some(bucket) => bucket.count = bucket.count.saturating_add(1),
            None => buckets.push(RatingBucket { label, count: 1 }),
        }
    }
    buckets
}

/// Hotel name, or the default when empty.
fn display_name(hotel: &Hotel) -> &str {
    if hotel.name.is_empty() {
        DEFAULT_HOTEL_NAME
    } else {
        &hotel.name
    }
}

/// Shortens long names for chart axes.
fn truncate_label(name: &str) -> String {
    if name.chars().count() > LABEL_MAX_CHARS {
        let head: String = name.chars().take(LABEL_MAX_CHARS).collect();
        format!("{head}...")
    } else {
        name.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RoomRate, RoomSummary};

    fn hotel(code: &str, name: &str, rating: u32, min_rate: &str) -> Hotel {
        Hotel {
            code: HotelCode::from(code),
            name: name.to_owned(),
            city_code: None,
            latitude: None,
            longitude: None,
            rating,
            category_name: format!("{rating} Stars"),
            category_is_fallback: false,
            address: String::new(),
            city: String::new(),
            min_rate: min_rate.to_owned(),
            currency: "USD".to_owned(),
            rooms: Vec::new(),
            amenities: vec!["WIFI".to_owned(), "POOL".to_owned(), "GYM".to_owned()],
            description: String::new(),
        }
    }

    #[test]
    fn card_defaults_and_formatting() {
        let mut h = hotel("A", "", 4, "99.5");
        h.rooms = vec![RoomSummary {
            code: "STANDARD".to_owned(),
            name: "Standard Room".to_owned(),
            rates: vec![RoomRate {
                net: "99.5".to_owned(),
                board_code: "HALF_BOARD".to_owned(),
                board_name: "Half Board".to_owned(),
            }],
        }];
        let card = ComparisonCard::from_hotel(&h);
        assert_eq!(card.name, "Hotel");
        assert_eq!(card.city, "Unknown");
        assert_eq!(card.price, "99.50");
        assert_eq!(card.stars, "\u{2605}\u{2605}\u{2605}\u{2605}");
        assert_eq!(card.board_name, "Half Board");
        assert_eq!(card.amenities, vec!["WIFI", "POOL"]);
    }

    #[test]
    fn unparsable_price_shows_zero() {
        let card = ComparisonCard::from_hotel(&hotel("A", "X", 3, "n/a"));
        assert_eq!(card.price, "0.00");
    }

    #[test]
    fn long_names_truncated_in_series() {
        let hotels = [
            hotel("A", "The Extraordinarily Long Hotel Name", 5, "300"),
            hotel("B", "Short", 3, "80"),
        ];
        let series = price_series(&hotels);
        let first = series.first().unwrap();
        assert_eq!(first.label, "The Extraordinarily ...");
        assert_eq!(first.full_name, "The Extraordinarily Long Hotel Name");
        assert!((first.price - 300.0).abs() < f64::EPSILON);
        assert_eq!(series.get(1).unwrap().label, "Short");
    }

    #[test]
    fn exactly_twenty_chars_not_truncated() {
        assert_eq!(truncate_label("abcdefghijklmnopqrst"), "abcdefghijklmnopqrst");
    }

    #[test]
    fn histogram_counts_in_first_seen_order() {
        let hotels = [
            hotel("A", "a", 4, "1"),
            hotel("B", "b", 5, "1"),
            hotel("C", "c", 4, "1"),
            hotel("D", "d", 0, "1"),
        ];
        let histogram = rating_histogram(&hotels);
        let pairs: Vec<(&str, usize)> = histogram
            .iter()
            .map(|bucket| (bucket.label.as_str(), bucket.count))
            .collect();
        assert_eq!(pairs, [("4 Stars", 2), ("5 Stars", 1), ("0 Stars", 1)]);
    }

    #[test]
    fn charts_need_two_hotels() {
        let one = ComparisonView::from_hotels(&[hotel("A", "a", 3, "1")]);
        assert!(!one.charts_available());
        let two = ComparisonView::from_hotels(&[hotel("A", "a", 3, "1"), hotel("B", "b", 4, "2")]);
        assert!(two.charts_available());
        assert!(ComparisonView::from_hotels(&[]).is_empty());
    }
}
