//! Front-end state stores backed by the [`Storage`](crate::storage::Storage)
//! port.
//!
//! Each store loads its key once on construction, treating absent or
//! malformed values as empty, and writes its whole state back after every
//! mutation.

mod filters;
mod selection;
mod session;

pub use filters::FilterStore;
pub use selection::SelectionStore;
pub use session::SearchSession;
