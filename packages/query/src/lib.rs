#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Filter compilation and paginated record queries.
//!
//! [`filter`] turns caller-supplied [`filter::FilterSpec`] parameters
//! into a normalized predicate plus a deterministic cache key.
//! [`engine`] runs a compiled predicate against a record store in a
//! single streaming pass with count-before-paginate semantics.

pub mod engine;
pub mod filter;

/// Errors for filter compilation and query execution.
///
/// Both variants indicate a bad request, not a system fault; callers
/// map them to a client-error category at the transport boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// A filter field could not be interpreted (e.g. malformed date).
    #[error("Invalid filter: {message}")]
    InvalidFilter {
        /// Description of what went wrong.
        message: String,
    },

    /// Pagination parameters were out of range.
    #[error("Invalid pagination: {message}")]
    InvalidPagination {
        /// Description of what went wrong.
        message: String,
    },
}
