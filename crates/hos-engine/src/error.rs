//! Error types for hos-engine operations.
//!
//! Every variant is an input error: the caller handed over something malformed.
//! Regulatory violations are never errors; they come back as values.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HosError {
    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid time interval: {0}")]
    InvalidInterval(String),

    #[error("Invalid start_time: {0}")]
    IntervalBeforePickup(String),

    #[error("Invalid start_time: {0}")]
    OverlappingInterval(String),

    #[error("Invalid trip window: {0}")]
    InvalidTripWindow(String),

    #[error("Invalid duty status: {0}")]
    InvalidStatus(String),

    #[error("Invalid truck type: {0}")]
    InvalidTruckType(String),

    #[error("Invalid plan input: {0}")]
    InvalidPlanInput(String),

    #[error("Invalid driver snapshot: {0}")]
    InvalidSnapshot(String),
}

pub type Result<T> = std::result::Result<T, HosError>;
