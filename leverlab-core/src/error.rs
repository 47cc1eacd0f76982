//! Typed errors for the analysis pipeline.
//!
//! Every stage fails fast with a structured value. Display strings are short
//! diagnostics for logs; turning them into user-facing text is the job of
//! whatever sits in front of the pipeline.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::YearMonth;

/// Malformed filter input or a ledger that breaks its construction contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("leverage '{input}' is not an integer")]
    NonIntegerLeverage { input: String },

    #[error("leverage must be positive, got {value}")]
    NonPositiveLeverage { value: i64 },

    #[error("exchange must not be empty")]
    EmptyExchange,

    #[error("start {start} is after end {end}")]
    InvertedDateRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    /// Record at `index` has a later entry time than the record before it.
    #[error("ledger is not descending by entry time at index {index}")]
    UnorderedLedger { index: usize },

    #[error("record #{sequence_number} has non-finite {field}")]
    NonFiniteField {
        sequence_number: i64,
        field: &'static str,
    },
}

/// The denominator that turned out to be zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnLeg {
    /// Oldest entry balance inside a month bucket.
    Monthly(YearMonth),
    /// Exit balance of the oldest record in the window.
    Strategy,
    /// BTC price of the oldest record in the window.
    Benchmark,
}

impl std::fmt::Display for ReturnLeg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReturnLeg::Monthly(ym) => write!(f, "monthly return for {ym}"),
            ReturnLeg::Strategy => write!(f, "strategy return"),
            ReturnLeg::Benchmark => write!(f, "benchmark return"),
        }
    }
}

/// Errors raised by the filter, aggregation and return stages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("validation: {0}")]
    Validation(#[from] ValidationError),

    #[error("range returns need at least one record")]
    EmptyRange,

    #[error("zero or vanishing denominator in {0}")]
    DivisionByZero(ReturnLeg),

    #[error("exchange '{exchange}' does not occur in the ledger")]
    UnknownCategory { exchange: String },
}

/// Bare taxonomy of [`AnalysisError`], for callers that only branch on kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Validation,
    EmptyRange,
    DivisionByZero,
    UnknownCategory,
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::Validation(_) => ErrorKind::Validation,
            AnalysisError::EmptyRange => ErrorKind::EmptyRange,
            AnalysisError::DivisionByZero(_) => ErrorKind::DivisionByZero,
            AnalysisError::UnknownCategory { .. } => ErrorKind::UnknownCategory,
        }
    }
}

pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_converts_into_analysis_error() {
        let err: AnalysisError = ValidationError::EmptyExchange.into();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn kinds_match_variants() {
        assert_eq!(AnalysisError::EmptyRange.kind(), ErrorKind::EmptyRange);
        assert_eq!(
            AnalysisError::DivisionByZero(ReturnLeg::Strategy).kind(),
            ErrorKind::DivisionByZero
        );
        assert_eq!(
            AnalysisError::UnknownCategory {
                exchange: "Kraken".into()
            }
            .kind(),
            ErrorKind::UnknownCategory
        );
    }

    #[test]
    fn monthly_leg_names_the_bucket() {
        let leg = ReturnLeg::Monthly(YearMonth::new(2020, 3));
        assert_eq!(leg.to_string(), "monthly return for 2020-03");
    }
}
