//! Duty-log validation.
//!
//! Walks a chronological list of duty-status intervals for one trip. Ordering
//! problems are input errors and stop the walk before any rule runs; rule
//! breaches are collected across the whole log and returned as suggestions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::HosError;
use crate::model::{DutyInterval, DutyStatus};
use crate::rules::TruckType;
use crate::time::{format_hours, EPSILON_HOURS};

pub const NO_VIOLATIONS: &str = "No violations detected.";

/// A trip's duty log, ready for validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DutyLogRequest {
    pub pickup_time: DateTime<Utc>,
    pub dropoff_time: DateTime<Utc>,
    pub truck_type: TruckType,
    pub duty_statuses: Vec<DutyInterval>,
}

/// Outcome of validating a well-formed duty log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DutyLogReport {
    pub violated: bool,
    pub suggestions: Vec<String>,
}

/// Validate a duty log against the driving cap and minimum rest for the
/// truck type.
///
/// # Errors
///
/// Fails before checking any rule when the log itself is malformed:
///
/// - [`HosError::InvalidTripWindow`] if `dropoff_time` precedes `pickup_time`
/// - [`HosError::InvalidInterval`] if an interval ends before it starts
/// - [`HosError::IntervalBeforePickup`] if the first interval starts before pickup
/// - [`HosError::OverlappingInterval`] if an interval starts before the previous
///   one ends
pub fn validate_duty_log(request: &DutyLogRequest) -> Result<DutyLogReport, HosError> {
    validate(
        request.pickup_time,
        request.dropoff_time,
        request.truck_type,
        &request.duty_statuses,
    )
}

/// Positional form of [`validate_duty_log`].
#[instrument(skip(duty_statuses), fields(intervals = duty_statuses.len()))]
pub fn validate(
    pickup_time: DateTime<Utc>,
    dropoff_time: DateTime<Utc>,
    truck_type: TruckType,
    duty_statuses: &[DutyInterval],
) -> Result<DutyLogReport, HosError> {
    check_ordering(pickup_time, dropoff_time, duty_statuses)?;

    let rules = truck_type.rules();
    let mut suggestions = Vec::new();

    for interval in duty_statuses {
        let duration = interval.duration_hours();

        if interval.status == DutyStatus::Driving && duration > rules.max_driving_hours {
            debug!(start = %interval.start_time, duration, "driving cap exceeded");
            suggestions.push(format!(
                "Exceeded driving limit between {} - {} ({} hours driven, limit {}). Recommend rest for {} hours.",
                interval.start_time.to_rfc3339(),
                interval.end_time.to_rfc3339(),
                format_hours(duration),
                format_hours(rules.max_driving_hours),
                format_hours(rules.rest_hours),
            ));
        }

        if interval.status.is_rest() && duration < rules.rest_hours {
            let shortfall = (rules.rest_hours - duration - EPSILON_HOURS).ceil().max(1.0);
            debug!(start = %interval.start_time, duration, shortfall, "insufficient rest");
            suggestions.push(format!(
                "Insufficient rest between {} - {}. Increase rest time by {} hours to reach the {}-hour minimum.",
                interval.start_time.to_rfc3339(),
                interval.end_time.to_rfc3339(),
                format_hours(shortfall),
                format_hours(rules.rest_hours),
            ));
        }
    }

    let violated = !suggestions.is_empty();
    if !violated {
        suggestions.push(NO_VIOLATIONS.to_string());
    }

    Ok(DutyLogReport {
        violated,
        suggestions,
    })
}

fn check_ordering(
    pickup_time: DateTime<Utc>,
    dropoff_time: DateTime<Utc>,
    duty_statuses: &[DutyInterval],
) -> Result<(), HosError> {
    if dropoff_time < pickup_time {
        return Err(HosError::InvalidTripWindow(format!(
            "dropoff_time {} is before pickup_time {}",
            dropoff_time.to_rfc3339(),
            pickup_time.to_rfc3339()
        )));
    }

    let mut previous_end: Option<DateTime<Utc>> = None;
    for interval in duty_statuses {
        if interval.end_time < interval.start_time {
            return Err(HosError::InvalidInterval(format!(
                "{} - {}",
                interval.start_time.to_rfc3339(),
                interval.end_time.to_rfc3339()
            )));
        }

        match previous_end {
            None if interval.start_time < pickup_time => {
                return Err(HosError::IntervalBeforePickup(format!(
                    "{} : start_time must be equal or greater than pickup_time",
                    interval.start_time.to_rfc3339()
                )));
            }
            Some(end) if interval.start_time < end => {
                return Err(HosError::OverlappingInterval(format!(
                    "{} : start_time must be equal or greater than end_time of previous status",
                    interval.start_time.to_rfc3339()
                )));
            }
            _ => {}
        }
        previous_end = Some(interval.end_time);
    }
    Ok(())
}
