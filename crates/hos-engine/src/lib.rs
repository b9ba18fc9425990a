//! # hos-engine
//!
//! Deterministic Hours-of-Service computation for commercial drivers.
//!
//! The engine checks driver counters against regulatory ceilings, validates
//! duty logs, and plans driving/rest schedules for a trip. Every operation is a
//! pure function of its inputs: no system clock, no I/O, no shared state. The
//! caller supplies the reference "now" where one is needed.
//!
//! ## Modules
//!
//! - [`compliance`] — driver snapshot + "now" → active violations
//! - [`duty_log`] — ordered duty-status intervals → flags and suggestions
//! - [`planner`] — trip bounds + loading time or distance/speed → schedule
//! - [`rules`] — regulatory constants per truck type
//! - [`model`] — shared input and output records
//! - [`wire`] — string-timestamped request records and their resolution
//! - [`time`] — hour/minute arithmetic and timestamp parsing
//! - [`error`] — Error types

pub mod compliance;
pub mod duty_log;
pub mod error;
pub mod model;
pub mod planner;
pub mod rules;
pub mod time;
pub mod wire;

pub use compliance::{evaluate, evaluate_fleet};
pub use duty_log::{validate, validate_duty_log, DutyLogReport, DutyLogRequest};
pub use error::HosError;
pub use model::{
    DriverSnapshot, DutyInterval, DutyStatus, SchedulePeriod, ScheduleResult, Violation,
    ViolationKind,
};
pub use planner::{
    plan, plan_with_distance, plan_with_loading, DistanceTrip, LoadingTrip, PlanRequest,
    PlannerOptions,
};
pub use rules::{RuleSet, TruckType};
pub use wire::{DriverRecord, DutyLogRecord, DutyStatusRecord, ScheduleRecord};
