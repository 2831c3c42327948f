//! Hotels page state: last results, pagination, and error banner.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{HotelError, Result};
use crate::models::Hotel;
use crate::pagination::Paginator;
use crate::search::SearchResults;
use crate::storage::{LAST_SEARCH_KEY, Storage, read_json, write_json};

/// Persisted page state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SessionState {
    /// Last successful results; `None` after a failure or before any
    /// search.
    results: Option<SearchResults>,
    /// Display window over `results`.
    paginator: Paginator,
    /// Banner message of the last failed search.
    error: Option<String>,
}

impl SessionState {
    /// The paginator must cover exactly the stored result list.
    fn is_consistent(&self) -> bool {
        let stored = self.results.as_ref().map_or(0, |results| results.hotels.len());
        self.paginator.total() == stored
    }
}

/// Outcome of the most recent search as shown on the hotels page.
///
/// A failed search never leaves a half-updated list behind: results are
/// dropped and the error's display message is kept instead.
#[derive(Debug)]
pub struct SearchSession<S: Storage> {
    /// Persistence backend.
    storage: S,
    /// Current state.
    state: SessionState,
}

impl<S: Storage> SearchSession<S> {
    /// Loads the persisted session, or an empty one.
    #[inline]
    pub fn load(storage: S) -> Self {
        let state = read_json::<SessionState, _>(&storage, LAST_SEARCH_KEY)
            .filter(|state| {
                let consistent = state.is_consistent();
                if !consistent {
                    tracing::warn!("ignoring inconsistent persisted search session");
                }
                consistent
            })
            .unwrap_or_default();
        Self { storage, state }
    }

    /// Installs a search outcome, resetting pagination to page 1.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails.
    #[inline]
    pub fn apply(&mut self, outcome: Result<SearchResults>) -> Result<()> {
        self.state = match outcome {
            Ok(results) => SessionState {
                paginator: Paginator::new(results.hotels.len()),
                results: Some(results),
                error: None,
            },
            Err(err) => {
                tracing::warn!(error = %err, "search failed");
                SessionState {
                    results: None,
                    paginator: Paginator::default(),
                    error: Some(err.user_message()),
                }
            }
        };
        self.persist()
    }

    /// Records a failed search.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails.
    #[inline]
    pub fn fail(&mut self, err: HotelError) -> Result<()> {
        self.apply(Err(err))
    }

    /// Reveals the next page.
    ///
    /// Returns `false` when everything is already displayed.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails.
    #[inline]
    pub fn load_more(&mut self) -> Result<bool> {
        if !self.state.paginator.load_more() {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Hotels currently displayed.
    #[inline]
    #[must_use]
    pub fn visible(&self) -> &[Hotel] {
        self.state
            .results
            .as_ref()
            .map(|results| self.state.paginator.visible(&results.hotels))
            .unwrap_or_default()
    }

    /// Every hotel of the last successful search.
    #[inline]
    #[must_use]
    pub fn hotels(&self) -> &[Hotel] {
        self.state
            .results
            .as_ref()
            .map(|results| results.hotels.as_slice())
            .unwrap_or_default()
    }

    /// Total number of hotels in the last successful search.
    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.state.results.as_ref().map_or(0, |results| results.total)
    }

    /// Stay dates of the last successful search.
    #[inline]
    #[must_use]
    pub fn stay(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.state
            .results
            .as_ref()
            .map(|results| (results.check_in, results.check_out))
    }

    /// `true` while more hotels can be revealed.
    #[inline]
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.state.paginator.has_more()
    }

    /// Banner message of the last failed search.
    #[inline]
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    /// Forgets the last search.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    #[inline]
    pub fn clear(&mut self) -> Result<()> {
        self.state = SessionState::default();
        self.storage.remove(LAST_SEARCH_KEY)
    }

    /// Writes the state to storage.
    fn persist(&self) -> Result<()> {
        write_json(&self.storage, LAST_SEARCH_KEY, &self.state)
    }
}
