//! Point-in-time HOS compliance evaluation for a driver snapshot.
//!
//! The evaluator reads the driver's accumulated counters and the caller's
//! reference instant, and reports every ceiling currently exceeded. It keeps no
//! state and never reads the system clock, so the same snapshot and `now`
//! always yield the same violations.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use crate::model::{DriverSnapshot, Violation, ViolationKind};
use crate::time::{format_hours, minutes_between, minutes_to_hours};

/// Evaluate one driver against the rule set for their truck type.
///
/// Checks, each contributing at most one [`Violation`] stamped with `now`:
///
/// - driving minutes above the driving ceiling (660 / 600, +120 adverse)
/// - elapsed duty time since `duty_status_start_time` above the on-duty
///   ceiling (840 / 900, +120 adverse); skipped when the start is unknown
/// - 8 hours of driving without the 30-minute break (property only)
/// - cycle minutes above `max_cycle_work_minutes`
/// - sleeper-berth minutes below the qualifying minimum (420 / 480)
///
/// The snapshot is taken as given: an empty `driver_id` is not rejected here.
/// Call [`DriverSnapshot::validate`] first, as [`DriverRecord::resolve`] does,
/// when the snapshot comes from outside.
///
/// [`DriverRecord::resolve`]: crate::wire::DriverRecord::resolve
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use hos_engine::{evaluate, DriverSnapshot, TruckType, ViolationKind};
///
/// let driver = DriverSnapshot {
///     shift_drive_minutes: Some(601),
///     ..DriverSnapshot::new("P-17", TruckType::Passenger)
/// };
/// let now = Utc.with_ymd_and_hms(2024, 1, 1, 18, 0, 0).unwrap();
/// let violations = evaluate(&driver, now);
/// assert_eq!(violations[0].violation_type, ViolationKind::TenHourDriving);
/// ```
#[instrument(skip_all, fields(driver_id = %driver.driver_id, truck_type = %driver.truck_type))]
pub fn evaluate(driver: &DriverSnapshot, now: DateTime<Utc>) -> Vec<Violation> {
    let rules = driver.rules();
    let extension = driver.adverse_extension();
    let id = &driver.driver_id;
    let mut violations = Vec::new();

    let mut record = |kind: ViolationKind, description: String| {
        debug!(violation = kind.tag(), "violation detected");
        violations.push(Violation {
            violation_type: kind,
            violation_description: description,
            violation_time: now,
        });
    };

    // Driving ceiling
    let drive_limit = driver.shift_drive_limit().saturating_add(extension);
    if let Some(driven) = driver.shift_drive_minutes {
        if driven > drive_limit {
            record(
                ViolationKind::driving_limit(driver.truck_type),
                format!(
                    "Driver {id} drove for more than {} hours.",
                    format_hours(minutes_to_hours(drive_limit))
                ),
            );
        }
    }

    // On-duty window, measured from the start of the current duty period
    let duty_limit = driver.shift_work_limit().saturating_add(extension);
    if let Some(started) = driver.duty_status_start_time {
        let on_duty = minutes_between(started, now);
        if on_duty > i64::from(duty_limit) {
            record(
                ViolationKind::on_duty_limit(driver.truck_type),
                format!(
                    "Driver {id} was on duty for more than {} hours.",
                    format_hours(minutes_to_hours(duty_limit))
                ),
            );
        }
    }

    // 30-minute break after 8 hours of driving
    if let (Some(threshold), Some(driven)) =
        (rules.break_after_drive_minutes, driver.shift_drive_minutes)
    {
        if driven >= threshold && !driver.took_break {
            record(
                ViolationKind::ThirtyMinuteBreak,
                format!(
                    "Driver {id} did not take a 30-minute break after {} hours of driving.",
                    format_hours(minutes_to_hours(threshold))
                ),
            );
        }
    }

    // 60/70-hour cycle
    let cycle_limit = driver.cycle_work_limit();
    if let Some(cycle) = driver.cycle_work_minutes {
        if cycle > cycle_limit {
            record(
                ViolationKind::CycleLimit,
                format!(
                    "Driver {id} exceeded their cycle limit of {} hours.",
                    format_hours(minutes_to_hours(cycle_limit))
                ),
            );
        }
    }

    // Sleeper berth minimum
    if let Some(sleeper) = driver.sleeper_berth_time {
        if sleeper < rules.sleeper_berth_minutes {
            record(
                ViolationKind::SleeperBerth,
                format!(
                    "Driver {id} did not meet the sleeper berth requirement of {} hours.",
                    format_hours(minutes_to_hours(rules.sleeper_berth_minutes))
                ),
            );
        }
    }

    debug!(count = violations.len(), "evaluation complete");
    violations
}

/// Evaluate many drivers against the same reference instant.
///
/// Returns a map from driver id to that driver's violations, in id order.
/// Drivers with no violations are left out. If the same id appears twice,
/// the later snapshot's violations replace the earlier ones. Snapshots are
/// not validated; see [`evaluate`].
#[instrument(skip_all, fields(drivers = drivers.len()))]
pub fn evaluate_fleet(
    drivers: &[DriverSnapshot],
    now: DateTime<Utc>,
) -> BTreeMap<String, Vec<Violation>> {
    drivers
        .iter()
        .filter_map(|driver| {
            let violations = evaluate(driver, now);
            (!violations.is_empty()).then(|| (driver.driver_id.clone(), violations))
        })
        .collect()
}
