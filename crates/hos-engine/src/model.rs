//! Records shared by the evaluator, the duty-log validator, and the planner.
//!
//! Inputs ([`DriverSnapshot`], [`DutyInterval`]) are plain values handed in by
//! the caller and never mutated. Outputs ([`Violation`], [`SchedulePeriod`],
//! [`ScheduleResult`]) are built fresh per call.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::HosError;
use crate::rules::{RuleSet, TruckType};
use crate::time;

// ── Driver snapshot ─────────────────────────────────────────────────────────

/// A driver's accumulated HOS counters at one point in time.
///
/// Counters left unset (`None`) are unknown and never produce a violation.
/// Per-driver maxima left unset, or set to zero, fall back to the
/// [`RuleSet`] baseline for the driver's truck type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverSnapshot {
    pub driver_id: String,
    pub truck_type: TruckType,
    /// Current status label as reported by the fleet provider.
    pub duty_status: Option<String>,
    pub duty_status_start_time: Option<DateTime<Utc>>,
    pub shift_work_minutes: Option<u32>,
    pub shift_drive_minutes: Option<u32>,
    pub cycle_work_minutes: Option<u32>,
    pub max_shift_work_minutes: Option<u32>,
    pub max_shift_drive_minutes: Option<u32>,
    pub max_cycle_work_minutes: Option<u32>,
    /// Whether a 30-minute break was taken after 8 hours of driving.
    pub took_break: bool,
    /// Qualifying sleeper-berth rest, in minutes.
    pub sleeper_berth_time: Option<u32>,
    pub adverse_conditions: bool,
    /// IANA name of the driver's home terminal zone.
    pub home_terminal_timezone: Option<String>,
}

impl DriverSnapshot {
    pub fn new(driver_id: impl Into<String>, truck_type: TruckType) -> Self {
        Self {
            driver_id: driver_id.into(),
            truck_type,
            ..Self::default()
        }
    }

    /// Check the fields that have no sensible default.
    pub fn validate(&self) -> Result<(), HosError> {
        if self.driver_id.trim().is_empty() {
            return Err(HosError::InvalidSnapshot(
                "driver_id must not be empty".to_string(),
            ));
        }
        if let Some(tz) = &self.home_terminal_timezone {
            time::parse_timezone(tz)?;
        }
        Ok(())
    }

    pub fn rules(&self) -> &'static RuleSet {
        self.truck_type.rules()
    }

    /// Driving ceiling in minutes, before any adverse-conditions extension.
    pub fn shift_drive_limit(&self) -> u32 {
        configured_or(self.max_shift_drive_minutes, self.rules().shift_drive_minutes)
    }

    /// On-duty ceiling in minutes, before any adverse-conditions extension.
    pub fn shift_work_limit(&self) -> u32 {
        configured_or(self.max_shift_work_minutes, self.rules().shift_work_minutes)
    }

    pub fn cycle_work_limit(&self) -> u32 {
        configured_or(self.max_cycle_work_minutes, self.rules().cycle_work_minutes)
    }

    /// Minutes added to the driving and duty ceilings.
    pub fn adverse_extension(&self) -> u32 {
        if self.adverse_conditions {
            self.rules().adverse_extension_minutes
        } else {
            0
        }
    }
}

fn configured_or(configured: Option<u32>, baseline: u32) -> u32 {
    configured.filter(|m| *m > 0).unwrap_or(baseline)
}

// ── Duty status intervals ───────────────────────────────────────────────────

/// The driver's activity category during one logged interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyStatus {
    Driving,
    OffDuty,
    SleeperBerth,
    OnDutyNotDriving,
}

impl DutyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DutyStatus::Driving => "driving",
            DutyStatus::OffDuty => "off_duty",
            DutyStatus::SleeperBerth => "sleeper_berth",
            DutyStatus::OnDutyNotDriving => "on_duty_not_driving",
        }
    }

    /// Off-duty and sleeper-berth time count toward mandatory rest.
    pub fn is_rest(self) -> bool {
        matches!(self, DutyStatus::OffDuty | DutyStatus::SleeperBerth)
    }
}

impl fmt::Display for DutyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the long names and the ELD shorthand codes (`D`, `OFF`, `SB`, `ON`).
impl FromStr for DutyStatus {
    type Err = HosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "driving" | "d" => Ok(DutyStatus::Driving),
            "off_duty" | "off" => Ok(DutyStatus::OffDuty),
            "sleeper_berth" | "sb" => Ok(DutyStatus::SleeperBerth),
            "on_duty" | "on_duty_not_driving" | "on" => Ok(DutyStatus::OnDutyNotDriving),
            _ => Err(HosError::InvalidStatus(format!("'{}'", s))),
        }
    }
}

/// One entry of a duty log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DutyInterval {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: DutyStatus,
}

impl DutyInterval {
    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>, status: DutyStatus) -> Self {
        Self {
            start_time,
            end_time,
            status,
        }
    }

    pub fn duration_hours(&self) -> f64 {
        time::hours_between(self.start_time, self.end_time)
    }
}

// ── Violations ──────────────────────────────────────────────────────────────

/// Which regulatory check fired. Serialized as the human-facing tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationKind {
    #[serde(rename = "11-Hour Driving Limit")]
    ElevenHourDriving,
    #[serde(rename = "10-Hour Driving Limit")]
    TenHourDriving,
    #[serde(rename = "14-Hour On-Duty Limit")]
    FourteenHourOnDuty,
    #[serde(rename = "15-Hour On-Duty Limit")]
    FifteenHourOnDuty,
    #[serde(rename = "30-Minute Break Requirement")]
    ThirtyMinuteBreak,
    #[serde(rename = "60/70-Hour On-Duty Limit")]
    CycleLimit,
    #[serde(rename = "Sleeper Berth Provision")]
    SleeperBerth,
}

impl ViolationKind {
    pub fn tag(self) -> &'static str {
        match self {
            ViolationKind::ElevenHourDriving => "11-Hour Driving Limit",
            ViolationKind::TenHourDriving => "10-Hour Driving Limit",
            ViolationKind::FourteenHourOnDuty => "14-Hour On-Duty Limit",
            ViolationKind::FifteenHourOnDuty => "15-Hour On-Duty Limit",
            ViolationKind::ThirtyMinuteBreak => "30-Minute Break Requirement",
            ViolationKind::CycleLimit => "60/70-Hour On-Duty Limit",
            ViolationKind::SleeperBerth => "Sleeper Berth Provision",
        }
    }

    pub fn driving_limit(truck_type: TruckType) -> Self {
        match truck_type {
            TruckType::Property => ViolationKind::ElevenHourDriving,
            TruckType::Passenger => ViolationKind::TenHourDriving,
        }
    }

    pub fn on_duty_limit(truck_type: TruckType) -> Self {
        match truck_type {
            TruckType::Property => ViolationKind::FourteenHourOnDuty,
            TruckType::Passenger => ViolationKind::FifteenHourOnDuty,
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub violation_type: ViolationKind,
    pub violation_description: String,
    pub violation_time: DateTime<Utc>,
}

// ── Schedules ───────────────────────────────────────────────────────────────

/// A driving or rest block. `end == start + hours`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SchedulePeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub hours: f64,
}

impl SchedulePeriod {
    pub fn starting_at(start: DateTime<Utc>, hours: f64) -> Self {
        Self {
            start,
            end: time::add_hours(start, hours),
            hours,
        }
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            hours: time::hours_between(start, end),
        }
    }
}

/// The plan returned by [`crate::planner::plan`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
    /// When the first driving period begins.
    pub start_time: DateTime<Utc>,
    pub driving_periods: Vec<SchedulePeriod>,
    pub rest_periods: Vec<SchedulePeriod>,
    pub total_driving_hours: f64,
    pub total_rest_hours: f64,
    /// Driving hours that could not be placed before the dropoff time.
    pub unscheduled_driving_hours: f64,
    /// Driving hours placed after the dropoff time.
    pub overrun_hours: f64,
    pub compliant: bool,
    pub message: String,
}
