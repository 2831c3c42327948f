//! Search filter form state.

use crate::error::Result;
use crate::models::{FilterUpdate, SearchFilters};
use crate::storage::{SEARCH_FILTERS_KEY, Storage, read_json, write_json};

/// Live filter form, mirrored to storage.
#[derive(Debug)]
pub struct FilterStore<S: Storage> {
    /// Persistence backend.
    storage: S,
    /// Current form state.
    filters: SearchFilters,
}

impl<S: Storage> FilterStore<S> {
    /// Loads persisted filters, or the defaults.
    #[inline]
    pub fn load(storage: S) -> Self {
        let filters = read_json(&storage, SEARCH_FILTERS_KEY).unwrap_or_default();
        Self { storage, filters }
    }

    /// Current filters.
    #[inline]
    #[must_use]
    pub const fn filters(&self) -> &SearchFilters {
        &self.filters
    }

    /// Shallow-merges `update` into the current filters.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails.
    #[inline]
    pub fn update(&mut self, update: FilterUpdate) -> Result<()> {
        if update.is_empty() {
            return Ok(());
        }
        self.filters.merge(update);
        if self.filters.check_out_precedes_check_in() {
            tracing::warn!(
                check_in = %self.filters.check_in,
                check_out = %self.filters.check_out,
                "check-out date precedes check-in date"
            );
        }
        self.persist()
    }

    /// Restores the default filters.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails.
    #[inline]
    pub fn reset(&mut self) -> Result<()> {
        self.filters = SearchFilters::default();
        self.persist()
    }

    /// Writes the filters to storage.
    fn persist(&self) -> Result<()> {
        write_json(&self.storage, SEARCH_FILTERS_KEY, &self.filters)
    }
}
