//! Hotels chosen for comparison.

use std::collections::HashSet;

use crate::error::Result;
use crate::models::{Hotel, HotelCode};
use crate::storage::{SELECTED_HOTELS_KEY, Storage, read_json, write_json};

/// Ordered set of selected hotels, unique by code, mirrored to storage.
#[derive(Debug)]
pub struct SelectionStore<S: Storage> {
    /// Persistence backend.
    storage: S,
    /// Selected hotels in insertion order.
    hotels: Vec<Hotel>,
}

impl<S: Storage> SelectionStore<S> {
    /// Loads the persisted selection.
    ///
    /// A malformed stored value is logged and the selection starts empty.
    /// Duplicate codes in the stored list keep their first occurrence.
    #[inline]
    pub fn load(storage: S) -> Self {
        let stored: Vec<Hotel> = read_json(&storage, SELECTED_HOTELS_KEY).unwrap_or_default();
        let mut seen = HashSet::new();
        let hotels: Vec<Hotel> = stored
            .into_iter()
            .filter(|hotel| seen.insert(hotel.code.clone()))
            .collect();
        tracing::debug!(count = hotels.len(), "loaded hotel selection");
        Self { storage, hotels }
    }

    /// Selected hotels in insertion order.
    #[inline]
    #[must_use]
    pub fn hotels(&self) -> &[Hotel] {
        &self.hotels
    }

    /// Number of selected hotels.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.hotels.len()
    }

    /// `true` when nothing is selected.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hotels.is_empty()
    }

    /// Returns `true` if a hotel with `code` is selected.
    #[inline]
    #[must_use]
    pub fn is_selected(&self, code: &HotelCode) -> bool {
        self.hotels.iter().any(|hotel| &hotel.code == code)
    }

    /// Adds `hotel` if its code is absent, otherwise removes it.
    ///
    /// Returns `true` if the hotel is selected afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails.
    #[inline]
    pub fn toggle(&mut self, hotel: Hotel) -> Result<bool> {
        let selected = if self.is_selected(&hotel.code) {
            self.hotels.retain(|existing| existing.code != hotel.code);
            false
        } else {
            self.hotels.push(hotel);
            true
        };
        self.persist()?;
        Ok(selected)
    }

    /// Removes the hotel with `code`.
    ///
    /// Returns `true` if something was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails.
    #[inline]
    pub fn remove(&mut self, code: &HotelCode) -> Result<bool> {
        let before = self.hotels.len();
        self.hotels.retain(|hotel| &hotel.code != code);
        self.persist()?;
        Ok(self.hotels.len() < before)
    }

    /// Removes every hotel.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails.
    #[inline]
    pub fn clear(&mut self) -> Result<()> {
        self.hotels.clear();
        self.persist()
    }

    /// Writes the full selection to storage.
    fn persist(&self) -> Result<()> {
        write_json(&self.storage, SELECTED_HOTELS_KEY, &self.hotels)
    }
}
