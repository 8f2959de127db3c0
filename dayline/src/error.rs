//! Error types for the date strip.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors produced while building or growing a date window.
///
/// Hosts see [`DateStripError::InvalidArgs`] from construction and
/// [`DateStripError::DateOutOfRange`] from navigation; the controller logs or
/// recovers from the other variants internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateStripError {
    /// A construction argument is outside its accepted range.
    #[error("invalid date strip argument `{field}`: {reason}")]
    InvalidArgs {
        /// Name of the offending field.
        field: &'static str,
        /// Human readable constraint that was violated.
        reason: String,
    },
    /// Calendar arithmetic left the representable date range.
    #[error("calendar arithmetic overflowed near {date}")]
    DateOutOfRange {
        /// The date the computation started from.
        date: NaiveDate,
    },
    /// Growth was asked of a window with no cells.
    #[error("cannot grow an empty date window")]
    EmptyWindow,
    /// Two neighbouring cells are not exactly one day apart.
    #[error("window is not contiguous at index {index}: {previous} is followed by {next}")]
    ContiguityViolation {
        /// Index of the later cell of the offending pair.
        index: usize,
        /// Date of the earlier cell.
        previous: NaiveDate,
        /// Date of the later cell.
        next: NaiveDate,
    },
}

impl DateStripError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgs {
            field,
            reason: reason.into(),
        }
    }
}
