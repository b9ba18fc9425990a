//! Trip schedule planning.
//!
//! Lays out alternating driving and rest blocks between a pickup and a dropoff
//! time. Two request shapes are supported:
//!
//! - [`LoadingTrip`]: the whole window after loading is driving capacity.
//! - [`DistanceTrip`]: driving time is derived from distance and average speed,
//!   with an optional one-time sleeper-berth split of the mandatory rest.
//!
//! Blocks are placed on a running cursor. A driving block never exceeds the
//! truck type's continuous-driving cap. Rest blocks are cut at the dropoff
//! time, and a rest cut down to nothing is left out. A driving block that would
//! run past dropoff is cut there, and the hours cut off are appended as one
//! trailing driving period (the *overrun*). Driving hours never reached because
//! planning ended first are reported as unscheduled.
//!
//! The two modes judge the shift window and compliance differently; see
//! [`plan_with_loading`] and [`plan_with_distance`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::HosError;
use crate::model::{SchedulePeriod, ScheduleResult};
use crate::rules::{RuleSet, TruckType};
use crate::time::{self, format_hours, hours_between, minutes_to_hours, EPSILON_HOURS};

pub const SUCCESS_MESSAGE: &str = "Schedule planned successfully within the given limits.";

/// Minimum length of the preceding driving block for the sleeper-berth split.
pub const SPLIT_TRIGGER_HOURS: f64 = 7.0;

/// Tunables for the planner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerOptions {
    /// Length of the first, shorter sleeper-berth segment. The second segment
    /// is the truck type's rest hours minus this.
    pub sleeper_split_first_hours: f64,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            sleeper_split_first_hours: 3.0,
        }
    }
}

/// Trip whose driving capacity is the window left after loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadingTrip {
    pub pickup_time: DateTime<Utc>,
    pub dropoff_time: DateTime<Utc>,
    pub loading_time_minutes: u32,
    pub truck_type: TruckType,
}

/// Trip whose driving time comes from distance and average speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceTrip {
    pub pickup_time: DateTime<Utc>,
    pub dropoff_time: DateTime<Utc>,
    pub total_distance: f64,
    pub avg_speed: f64,
    pub sleeper_berth_flexibility: bool,
    pub truck_type: TruckType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PlanRequest {
    Loading(LoadingTrip),
    Distance(DistanceTrip),
}

/// Plan a trip in whichever mode the request selects.
pub fn plan(request: &PlanRequest, options: &PlannerOptions) -> Result<ScheduleResult, HosError> {
    match request {
        PlanRequest::Loading(trip) => plan_with_loading(trip),
        PlanRequest::Distance(trip) => plan_with_distance(trip, options),
    }
}

/// Plan a trip whose driving capacity is `dropoff - pickup - loading`.
///
/// Driving starts once loading is done. The shift runs from pickup, or from
/// the end of the last full rest, to the end of each driving block; a breach
/// is reported but does not cut the plan short. The plan is non-compliant on a
/// shift breach, on overrun, or when driving hours are left unscheduled.
///
/// # Errors
///
/// Returns [`HosError::InvalidTripWindow`] if dropoff precedes pickup.
#[instrument(skip_all, fields(truck_type = %trip.truck_type, loading = trip.loading_time_minutes))]
pub fn plan_with_loading(trip: &LoadingTrip) -> Result<ScheduleResult, HosError> {
    check_window(trip.pickup_time, trip.dropoff_time)?;
    let rules = trip.truck_type.rules();

    let loading_hours = minutes_to_hours(trip.loading_time_minutes);
    let driving_start = time::add_hours(trip.pickup_time, loading_hours);
    let total_driving_hours = hours_between(trip.pickup_time, trip.dropoff_time) - loading_hours;

    if total_driving_hours <= EPSILON_HOURS {
        return Ok(ScheduleResult {
            start_time: driving_start,
            driving_periods: Vec::new(),
            rest_periods: Vec::new(),
            total_driving_hours: 0.0,
            total_rest_hours: 0.0,
            unscheduled_driving_hours: 0.0,
            overrun_hours: 0.0,
            compliant: false,
            message: format!(
                "Loading time of {} minutes leaves no driving time before the dropoff time.",
                trip.loading_time_minutes
            ),
        });
    }

    // Loading is on-duty time, so the shift starts at pickup
    let mut allocator = Allocator::new(
        Mode::Loading,
        rules,
        trip.pickup_time,
        trip.dropoff_time,
        total_driving_hours,
    );
    allocator.cursor = driving_start;
    allocator.run();
    Ok(allocator.finish(driving_start))
}

/// Plan a trip from distance and average speed.
///
/// Driving time is `ceil(total_distance / avg_speed)` hours. If that does not
/// fit between pickup and dropoff the result is non-compliant and empty. With
/// `sleeper_berth_flexibility`, the first rest that follows a block of at least
/// [`SPLIT_TRIGGER_HOURS`] is split into two segments.
///
/// After each rest, planning stops if more than the shift window has elapsed
/// since pickup. The finished plan is compliant unless the shift window was
/// breached, the trip's driving time exceeds the continuous-driving cap, or
/// the rest it holds totals less than the mandatory minimum.
///
/// # Errors
///
/// Returns [`HosError::InvalidTripWindow`] if dropoff precedes pickup, and
/// [`HosError::InvalidPlanInput`] for a non-positive speed, a negative distance,
/// or a split segment that does not fit inside the rest period.
#[instrument(skip_all, fields(truck_type = %trip.truck_type, distance = trip.total_distance, speed = trip.avg_speed))]
pub fn plan_with_distance(
    trip: &DistanceTrip,
    options: &PlannerOptions,
) -> Result<ScheduleResult, HosError> {
    check_window(trip.pickup_time, trip.dropoff_time)?;
    let rules = trip.truck_type.rules();
    let total_driving_hours = time::driving_hours_for(trip.total_distance, trip.avg_speed)?;

    let split_first_hours = if trip.sleeper_berth_flexibility {
        let first = options.sleeper_split_first_hours;
        if !first.is_finite() || first <= 0.0 || first >= rules.rest_hours {
            return Err(HosError::InvalidPlanInput(format!(
                "sleeper split segment of {} hours must be between 0 and {} hours",
                first, rules.rest_hours
            )));
        }
        Some(first)
    } else {
        None
    };

    let available_hours = hours_between(trip.pickup_time, trip.dropoff_time);
    if total_driving_hours > available_hours {
        debug!(total_driving_hours, available_hours, "trip infeasible");
        return Ok(ScheduleResult {
            start_time: trip.pickup_time,
            driving_periods: Vec::new(),
            rest_periods: Vec::new(),
            total_driving_hours: 0.0,
            total_rest_hours: 0.0,
            unscheduled_driving_hours: total_driving_hours,
            overrun_hours: 0.0,
            compliant: false,
            message: format!(
                "Trip requires {} driving hours but only {} hours are available between pickup and dropoff.",
                format_hours(total_driving_hours),
                format_hours(available_hours)
            ),
        });
    }

    let mut allocator = Allocator::new(
        Mode::Distance,
        rules,
        trip.pickup_time,
        trip.dropoff_time,
        total_driving_hours,
    );
    allocator.split_first_hours = split_first_hours;
    allocator.run();
    Ok(allocator.finish(trip.pickup_time))
}

fn check_window(pickup: DateTime<Utc>, dropoff: DateTime<Utc>) -> Result<(), HosError> {
    if dropoff < pickup {
        return Err(HosError::InvalidTripWindow(format!(
            "dropoff_time {} is before pickup_time {}",
            dropoff.to_rfc3339(),
            pickup.to_rfc3339()
        )));
    }
    Ok(())
}

// ── Block allocation ────────────────────────────────────────────────────────

/// Which request shape is being planned; selects the shift and compliance rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Shift measured per driving block from the current shift start; a
    /// breach is reported and planning continues.
    Loading,
    /// Shift measured from pickup after each rest; a breach stops planning.
    Distance,
}

/// Cursor state for one planning call.
struct Allocator {
    mode: Mode,
    rules: &'static RuleSet,
    pickup: DateTime<Utc>,
    dropoff: DateTime<Utc>,
    cursor: DateTime<Utc>,
    /// Start of the current shift in loading mode; moves to the end of each
    /// full-length rest.
    shift_start: DateTime<Utc>,
    /// Driving hours the trip needs in total.
    required: f64,
    remaining: f64,
    /// First sleeper segment length while the split is still available.
    split_first_hours: Option<f64>,
    driving: Vec<SchedulePeriod>,
    rest: Vec<SchedulePeriod>,
    overrun: f64,
    shift_exceeded: bool,
}

impl Allocator {
    fn new(
        mode: Mode,
        rules: &'static RuleSet,
        pickup: DateTime<Utc>,
        dropoff: DateTime<Utc>,
        required: f64,
    ) -> Self {
        Self {
            mode,
            rules,
            pickup,
            dropoff,
            cursor: pickup,
            shift_start: pickup,
            required,
            remaining: required,
            split_first_hours: None,
            driving: Vec::new(),
            rest: Vec::new(),
            overrun: 0.0,
            shift_exceeded: false,
        }
    }

    fn run(&mut self) {
        while self.remaining > EPSILON_HOURS {
            let block_hours = self.remaining.min(self.rules.max_driving_hours);
            let block_end = time::add_hours(self.cursor, block_hours);
            self.remaining -= block_hours;

            if block_end > self.dropoff {
                let kept = SchedulePeriod::between(self.cursor, self.dropoff);
                self.overrun = block_hours - kept.hours;
                debug!(overrun = self.overrun, "driving block cut at dropoff");
                if kept.hours > EPSILON_HOURS {
                    self.push_driving(kept);
                }
                break;
            }

            self.push_driving(SchedulePeriod::starting_at(self.cursor, block_hours));
            if self.remaining <= EPSILON_HOURS || block_end >= self.dropoff {
                break;
            }

            self.allocate_rest(block_hours);
            let elapsed = hours_between(self.pickup, self.cursor);
            if self.mode == Mode::Distance && elapsed > self.rules.max_shift_hours + EPSILON_HOURS {
                debug!(elapsed, "shift window exceeded, stopping");
                self.shift_exceeded = true;
                break;
            }
            if self.cursor >= self.dropoff {
                break;
            }
        }

        if self.overrun > EPSILON_HOURS {
            let trailing = SchedulePeriod::starting_at(self.cursor, self.overrun);
            self.push_driving(trailing);
        }
    }

    fn push_driving(&mut self, period: SchedulePeriod) {
        let shift_hours = hours_between(self.shift_start, period.end);
        if self.mode == Mode::Loading && shift_hours > self.rules.max_shift_hours + EPSILON_HOURS {
            self.shift_exceeded = true;
        }
        debug!(start = %period.start, hours = period.hours, "driving block");
        self.cursor = period.end;
        self.driving.push(period);
    }

    /// Place the mandatory rest after a driving block, split if allowed.
    fn allocate_rest(&mut self, block_hours: f64) {
        let full = self.rules.rest_hours;
        let taken = match self.split_first_hours {
            Some(first) if block_hours >= SPLIT_TRIGGER_HOURS => {
                self.split_first_hours = None;
                debug!(first, second = full - first, "sleeper berth split");
                self.push_rest(first) + self.push_rest(full - first)
            }
            _ => self.push_rest(full),
        };

        if taken >= full - EPSILON_HOURS {
            self.shift_start = self.cursor;
        }
    }

    /// Place one rest segment, cut at dropoff. Returns the hours placed.
    fn push_rest(&mut self, hours: f64) -> f64 {
        if self.cursor >= self.dropoff {
            return 0.0;
        }
        let end = time::add_hours(self.cursor, hours);
        let period = if end > self.dropoff {
            SchedulePeriod::between(self.cursor, self.dropoff)
        } else {
            SchedulePeriod::starting_at(self.cursor, hours)
        };
        if period.hours <= EPSILON_HOURS {
            return 0.0;
        }
        debug!(start = %period.start, hours = period.hours, "rest block");
        self.cursor = period.end;
        self.rest.push(period);
        period.hours
    }

    fn finish(self, start_time: DateTime<Utc>) -> ScheduleResult {
        let total_driving_hours: f64 = self.driving.iter().map(|p| p.hours).sum();
        let total_rest_hours: f64 = self.rest.iter().map(|p| p.hours).sum();
        let unscheduled = self.remaining.max(0.0);
        let unscheduled = if unscheduled > EPSILON_HOURS { unscheduled } else { 0.0 };
        let overrun = if self.overrun > EPSILON_HOURS { self.overrun } else { 0.0 };

        let reasons = match self.mode {
            Mode::Loading => self.loading_reasons(overrun, unscheduled),
            Mode::Distance => self.distance_reasons(total_rest_hours),
        };

        let compliant = reasons.is_empty();
        let message = if compliant {
            SUCCESS_MESSAGE.to_string()
        } else {
            reasons.join(" ")
        };
        debug!(compliant, total_driving_hours, total_rest_hours, "plan complete");

        ScheduleResult {
            start_time,
            driving_periods: self.driving,
            rest_periods: self.rest,
            total_driving_hours,
            total_rest_hours,
            unscheduled_driving_hours: unscheduled,
            overrun_hours: overrun,
            compliant,
            message,
        }
    }

    fn loading_reasons(&self, overrun: f64, unscheduled: f64) -> Vec<String> {
        let mut reasons = Vec::new();
        if self.shift_exceeded {
            reasons.push(format!(
                "The {}-hour shift window is exceeded.",
                format_hours(self.rules.max_shift_hours)
            ));
        }
        if overrun > 0.0 {
            reasons.push(format!(
                "{} driving hours run past the dropoff time.",
                format_hours(overrun)
            ));
        }
        if unscheduled > 0.0 {
            reasons.push(format!(
                "{} driving hours could not be scheduled before the dropoff time.",
                format_hours(unscheduled)
            ));
        }
        reasons
    }

    fn distance_reasons(&self, total_rest_hours: f64) -> Vec<String> {
        let mut reasons = Vec::new();
        if self.shift_exceeded {
            reasons.push(format!(
                "Planning stopped after {} hours since pickup, beyond the {}-hour shift window.",
                format_hours(hours_between(self.pickup, self.cursor)),
                format_hours(self.rules.max_shift_hours)
            ));
        }
        if self.required > self.rules.max_driving_hours + EPSILON_HOURS {
            reasons.push(format!(
                "Trip requires {} driving hours, more than the {}-hour driving limit.",
                format_hours(self.required),
                format_hours(self.rules.max_driving_hours)
            ));
        }
        // A trip that fits one driving block needs no rest
        if total_rest_hours > EPSILON_HOURS
            && total_rest_hours < self.rules.rest_hours - EPSILON_HOURS
        {
            reasons.push(format!(
                "Total rest of {} hours is below the {}-hour minimum.",
                format_hours(total_rest_hours),
                format_hours(self.rules.rest_hours)
            ));
        }
        reasons
    }
}
