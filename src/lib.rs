//! Hotel search, normalization, and comparison.
//!
//! This crate wraps a hotel-availability provider behind typed clients
//! ([`client`]), turns its offer records into uniform [`models::Hotel`]s
//! ([`normalize`]), and runs the destination → hotel list → offers search
//! pipeline ([`search`]). Front-end state (filters, paginated results, the
//! comparison selection, sessions) lives in [`store`] on top of a pluggable
//! key-value [`storage`] port. Accounts are handled by an external auth
//! provider ([`auth`]); the admin panel ([`admin`]) lists and deletes them.
//!
//! The `hotels` binary (feature `cli`) drives all of it from a terminal.

pub mod admin;
pub mod auth;
pub mod city;
#[cfg(any(feature = "async", feature = "blocking"))]
pub mod client;
pub mod comparison;
pub mod error;
pub mod models;
pub mod navigation;
pub mod normalize;
pub mod pagination;
pub mod search;
pub mod storage;
pub mod store;
pub mod token_cache;
