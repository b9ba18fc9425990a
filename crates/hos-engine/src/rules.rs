//! Regulatory constants keyed by truck type.
//!
//! The rule set is a closed variant: every check matches on [`TruckType`]
//! exhaustively and reads its limits from the [`RuleSet`] record rather than
//! comparing strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HosError;

/// Regulatory driver class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruckType {
    /// Property-carrying: 11h driving, 14h window, 10h rest.
    #[default]
    Property,
    /// Passenger-carrying: 10h driving, 15h window, 8h rest.
    Passenger,
}

impl TruckType {
    pub fn as_str(self) -> &'static str {
        match self {
            TruckType::Property => "property",
            TruckType::Passenger => "passenger",
        }
    }

    /// The constants that apply to this driver class.
    pub fn rules(self) -> &'static RuleSet {
        RuleSet::for_truck(self)
    }
}

impl fmt::Display for TruckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TruckType {
    type Err = HosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "property" => Ok(TruckType::Property),
            "passenger" => Ok(TruckType::Passenger),
            _ => Err(HosError::InvalidTruckType(format!(
                "'{}' (expected 'property' or 'passenger')",
                s
            ))),
        }
    }
}

/// Hour and minute ceilings for one driver class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RuleSet {
    /// Maximum continuous driving per shift, in hours.
    pub max_driving_hours: f64,
    /// Mandatory rest between shifts, in hours.
    pub rest_hours: f64,
    /// Maximum on-duty window per shift, in hours.
    pub max_shift_hours: f64,
    /// Baseline for `max_shift_drive_minutes`.
    pub shift_drive_minutes: u32,
    /// Baseline for `max_shift_work_minutes`.
    pub shift_work_minutes: u32,
    /// Baseline for `max_cycle_work_minutes` (70 hours).
    pub cycle_work_minutes: u32,
    /// Driving minutes after which a 30-minute break is due, if enforced.
    pub break_after_drive_minutes: Option<u32>,
    /// Minimum qualifying sleeper-berth minutes.
    pub sleeper_berth_minutes: u32,
    /// Extension applied to driving and duty ceilings under adverse conditions.
    pub adverse_extension_minutes: u32,
}

pub const PROPERTY_RULES: RuleSet = RuleSet {
    max_driving_hours: 11.0,
    rest_hours: 10.0,
    max_shift_hours: 14.0,
    shift_drive_minutes: 660,
    shift_work_minutes: 840,
    cycle_work_minutes: 4200,
    break_after_drive_minutes: Some(480),
    sleeper_berth_minutes: 420,
    adverse_extension_minutes: 120,
};

pub const PASSENGER_RULES: RuleSet = RuleSet {
    max_driving_hours: 10.0,
    rest_hours: 8.0,
    max_shift_hours: 15.0,
    shift_drive_minutes: 600,
    shift_work_minutes: 900,
    cycle_work_minutes: 4200,
    break_after_drive_minutes: None,
    sleeper_berth_minutes: 480,
    adverse_extension_minutes: 120,
};

impl RuleSet {
    pub fn for_truck(truck_type: TruckType) -> &'static RuleSet {
        match truck_type {
            TruckType::Property => &PROPERTY_RULES,
            TruckType::Passenger => &PASSENGER_RULES,
        }
    }
}
