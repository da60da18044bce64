//! Error types for fiscal-date operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("Invalid quarter configuration: {0}")]
    QuarterConfiguration(String),

    #[error("Invalid operand: {0}")]
    InvalidOperand(String),

    #[error("Invalid duration: {0}")]
    DurationParse(String),

    #[error("Interval computation failed: {0}")]
    IntervalComputation(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid format: {0}")]
    Format(String),
}

pub type Result<T> = std::result::Result<T, DateError>;
