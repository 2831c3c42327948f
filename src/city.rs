//! Destination text → provider city code resolution.
//!
//! Lookup is exact after trimming and lowercasing. There is deliberately
//! no fallback city: an unknown destination resolves to `None` and the
//! caller must stop.

use std::collections::HashMap;

use crate::models::CityCode;

/// Destinations suggested to users whose input did not resolve.
pub const EXAMPLE_DESTINATIONS: &[&str] = &[
    "New York",
    "Miami",
    "Los Angeles",
    "Chicago",
    "London",
    "Paris",
    "Barcelona",
    "Dubai",
];

/// Built-in lowercase destination name → city code table.
const CITY_CODES: &[(&str, &str)] = &[
    ("new york", "NYC"),
    ("nyc", "NYC"),
    ("miami", "MIA"),
    ("los angeles", "LAX"),
    ("la", "LAX"),
    ("chicago", "CHI"),
    ("denver", "DEN"),
    ("boston", "BOS"),
    ("san francisco", "SFO"),
    ("sf", "SFO"),
    ("las vegas", "LAS"),
    ("vegas", "LAS"),
    ("orlando", "MCO"),
    ("seattle", "SEA"),
    ("washington", "WAS"),
    ("dc", "WAS"),
    ("atlanta", "ATL"),
    ("paris", "PAR"),
    ("london", "LON"),
    ("barcelona", "BCN"),
    ("madrid", "MAD"),
    ("rome", "ROM"),
    ("dubai", "DXB"),
    ("tokyo", "TYO"),
    ("singapore", "SIN"),
    ("bangkok", "BKK"),
    ("amsterdam", "AMS"),
    ("berlin", "BER"),
    ("prague", "PRG"),
    ("vienna", "VIE"),
    ("lisbon", "LIS"),
    ("milan", "MIL"),
    ("venice", "VCE"),
    ("florence", "FLR"),
    ("istanbul", "IST"),
    ("athens", "ATH"),
    ("sydney", "SYD"),
    ("melbourne", "MEL"),
    ("hong kong", "HKG"),
    ("toronto", "YTO"),
    ("vancouver", "YVR"),
    ("montreal", "YMQ"),
    ("mumbai", "BOM"),
    ("bombay", "BOM"),
    ("delhi", "DEL"),
    ("new delhi", "DEL"),
    ("goa", "GOI"),
    ("bangalore", "BLR"),
    ("bengaluru", "BLR"),
    ("chennai", "MAA"),
    ("kolkata", "CCU"),
    ("hyderabad", "HYD"),
    ("jaipur", "JAI"),
    ("pune", "PNQ"),
    ("kochi", "COK"),
    ("udaipur", "UDR"),
    ("agra", "AGR"),
];

/// One entry of the destination catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// Lowercase destination name as matched.
    pub name: String,
    /// Provider city code.
    pub code: CityCode,
}

/// Resolves free-text destinations against a static table.
///
/// Constructed explicitly and owned by whoever runs searches, so tests can
/// supply their own table.
#[derive(Debug, Clone)]
pub struct CityResolver {
    /// Lookup index keyed by normalized name.
    index: HashMap<String, CityCode>,
    /// Catalogue in declaration order.
    catalogue: Vec<Destination>,
}

impl Default for CityResolver {
    #[inline]
    fn default() -> Self {
        Self::with_table(CITY_CODES.iter().copied())
    }
}

impl CityResolver {
    /// Creates a resolver over the built-in city table.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver over a custom `(name, code)` table.
    ///
    /// Names are normalized the same way lookups are; later duplicates
    /// win.
    #[inline]
    pub fn with_table<I, N, C>(table: I) -> Self
    where
        I: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: Into<String>,
    {
        let mut index = HashMap::new();
        let mut catalogue = Vec::new();
        for (name, code) in table {
            let key = normalize(name.as_ref());
            let city_code = CityCode::new(code.into());
            let _previous = index.insert(key.clone(), city_code.clone());
            catalogue.push(Destination {
                name: key,
                code: city_code,
            });
        }
        Self { index, catalogue }
    }

    /// Resolves destination text to a city code.
    ///
    /// Returns `None` for empty input or names absent from the table.
    #[inline]
    #[must_use]
    pub fn resolve(&self, text: &str) -> Option<CityCode> {
        let key = normalize(text);
        if key.is_empty() {
            return None;
        }
        let code = self.index.get(&key).cloned();
        if code.is_none() {
            tracing::debug!(destination = %text, "destination not in city table");
        }
        code
    }

    /// Returns every known destination in table order.
    #[inline]
    #[must_use]
    pub fn destinations(&self) -> &[Destination] {
        &self.catalogue
    }
}

/// Trims and lowercases destination text.
fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
