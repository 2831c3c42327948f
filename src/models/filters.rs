//! Search filter form state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format used for check-in and check-out values.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Current search form state.
///
/// All fields are kept as text exactly as entered; the search pipeline
/// interprets them. Empty strings mean "not set".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchFilters {
    /// Free-text destination.
    pub destination: String,
    /// Check-in date, `YYYY-MM-DD`.
    pub check_in: String,
    /// Check-out date, `YYYY-MM-DD`.
    pub check_out: String,
    /// Number of adults.
    pub adults: String,
    /// Number of children.
    pub children: String,
    /// Number of rooms.
    pub rooms: String,
    /// Minimum star rating.
    pub rating: String,
    /// Lower price bound.
    pub min_price: String,
    /// Upper price bound.
    pub max_price: String,
}

impl Default for SearchFilters {
    #[inline]
    fn default() -> Self {
        Self {
            destination: String::new(),
            check_in: String::new(),
            check_out: String::new(),
            adults: "2".to_owned(),
            children: "0".to_owned(),
            rooms: "1".to_owned(),
            rating: String::new(),
            min_price: String::new(),
            max_price: String::new(),
        }
    }
}

impl SearchFilters {
    /// Creates filters with only a destination set.
    #[inline]
    #[must_use]
    pub fn for_destination<T: Into<String>>(destination: T) -> Self {
        Self {
            destination: destination.into(),
            ..Self::default()
        }
    }

    /// Shallow-merges a partial update: every field present in `update`
    /// replaces the current value.
    #[inline]
    pub fn merge(&mut self, update: FilterUpdate) {
        let FilterUpdate {
            destination,
            check_in,
            check_out,
            adults,
            children,
            rooms,
            rating,
            min_price,
            max_price,
        } = update;
        merge_field(&mut self.destination, destination);
        merge_field(&mut self.check_in, check_in);
        merge_field(&mut self.check_out, check_out);
        merge_field(&mut self.adults, adults);
        merge_field(&mut self.children, children);
        merge_field(&mut self.rooms, rooms);
        merge_field(&mut self.rating, rating);
        merge_field(&mut self.min_price, min_price);
        merge_field(&mut self.max_price, max_price);
    }

    /// Returns `true` when both dates are set, parse, and check-out falls
    /// before check-in.
    ///
    /// Interactive front ends use this to keep the pickers consistent; the
    /// search pipeline itself does not reject such filters.
    #[inline]
    #[must_use]
    pub fn check_out_precedes_check_in(&self) -> bool {
        let parse = |raw: &str| NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok();
        match (parse(&self.check_in), parse(&self.check_out)) {
            (Some(check_in), Some(check_out)) => check_out < check_in,
            _ => false,
        }
    }
}

/// Replaces `target` when `value` is present.
fn merge_field(target: &mut String, value: Option<String>) {
    if let Some(new_value) = value {
        *target = new_value;
    }
}

/// A partial filter edit; `None` fields leave the current value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterUpdate {
    /// New destination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    /// New check-in date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in: Option<String>,
    /// New check-out date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out: Option<String>,
    /// New adult count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adults: Option<String>,
    /// New child count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<String>,
    /// New room count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rooms: Option<String>,
    /// New minimum rating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    /// New lower price bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<String>,
    /// New upper price bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<String>,
}

impl FilterUpdate {
    /// Returns `true` when the update changes nothing.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_form_defaults() {
        let filters = SearchFilters::default();
        assert_eq!(filters.adults, "2");
        assert_eq!(filters.children, "0");
        assert_eq!(filters.rooms, "1");
        assert!(filters.destination.is_empty());
        assert!(filters.rating.is_empty());
    }

    #[test]
    fn merge_replaces_only_present_fields() {
        let mut filters = SearchFilters::for_destination("Paris");
        filters.merge(FilterUpdate {
            rating: Some("4".to_owned()),
            adults: Some("3".to_owned()),
            ..FilterUpdate::default()
        });
        assert_eq!(filters.destination, "Paris");
        assert_eq!(filters.rating, "4");
        assert_eq!(filters.adults, "3");
        assert_eq!(filters.rooms, "1");
    }

    #[test]
    fn merge_can_clear_a_field() {
        let mut filters = SearchFilters::for_destination("Paris");
        filters.merge(FilterUpdate {
            destination: Some(String::new()),
            ..FilterUpdate::default()
        });
        assert!(filters.destination.is_empty());
    }

    #[test]
    fn detects_reversed_dates() {
        let mut filters = SearchFilters::default();
        filters.check_in = "2026-05-10".to_owned();
        filters.check_out = "2026-05-08".to_owned();
        assert!(filters.check_out_precedes_check_in());
        filters.check_out = "2026-05-12".to_owned();
        assert!(!filters.check_out_precedes_check_in());
        filters.check_out = String::new();
        assert!(!filters.check_out_precedes_check_in());
    }

    #[test]
    fn deserialize_partial_filters_uses_defaults() {
        let filters: SearchFilters = serde_json::from_str(r#"{"destination": "Rome"}"#).unwrap();
        assert_eq!(filters.destination, "Rome");
        assert_eq!(filters.adults, "2");
    }

    #[test]
    fn empty_update_detected() {
        assert!(FilterUpdate::default().is_empty());
        let update = FilterUpdate {
            max_price: Some("100".to_owned()),
            ..FilterUpdate::default()
        };
        assert!(!update.is_empty());
    }
}
