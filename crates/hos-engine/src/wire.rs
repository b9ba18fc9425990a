//! Request records as a transport delivers them.
//!
//! Timestamps arrive as strings and statuses as free-form labels. Each record
//! resolves into the typed input of one operation against a timezone used for
//! timestamps that carry no offset. Resolution fails on the first malformed
//! field, before any regulatory rule runs.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::duty_log::DutyLogRequest;
use crate::error::HosError;
use crate::model::{DriverSnapshot, DutyInterval, DutyStatus};
use crate::planner::{DistanceTrip, LoadingTrip, PlanRequest};
use crate::rules::TruckType;
use crate::time::parse_timestamp;

/// Driver record as synchronized from the fleet provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverRecord {
    pub driver_id: String,
    pub truck_type: TruckType,
    pub duty_status: Option<String>,
    pub duty_status_start_time: Option<String>,
    pub shift_work_minutes: Option<u32>,
    pub shift_drive_minutes: Option<u32>,
    pub cycle_work_minutes: Option<u32>,
    pub max_shift_work_minutes: Option<u32>,
    pub max_shift_drive_minutes: Option<u32>,
    pub max_cycle_work_minutes: Option<u32>,
    pub took_break: bool,
    pub sleeper_berth_time: Option<u32>,
    pub adverse_conditions: bool,
    pub home_terminal_timezone: Option<String>,
}

impl DriverRecord {
    /// Resolve into a validated [`DriverSnapshot`].
    ///
    /// A naive `duty_status_start_time` is read in the driver's home terminal
    /// zone when one is given, otherwise in `default_tz`.
    pub fn resolve(self, default_tz: &Tz) -> Result<DriverSnapshot, HosError> {
        let tz = match &self.home_terminal_timezone {
            Some(name) => crate::time::parse_timezone(name)?,
            None => *default_tz,
        };
        let duty_status_start_time = self
            .duty_status_start_time
            .as_deref()
            .map(|s| parse_timestamp(s, &tz))
            .transpose()?;

        let snapshot = DriverSnapshot {
            driver_id: self.driver_id.trim().to_string(),
            truck_type: self.truck_type,
            duty_status: self.duty_status,
            duty_status_start_time,
            shift_work_minutes: self.shift_work_minutes,
            shift_drive_minutes: self.shift_drive_minutes,
            cycle_work_minutes: self.cycle_work_minutes,
            max_shift_work_minutes: self.max_shift_work_minutes,
            max_shift_drive_minutes: self.max_shift_drive_minutes,
            max_cycle_work_minutes: self.max_cycle_work_minutes,
            took_break: self.took_break,
            sleeper_berth_time: self.sleeper_berth_time,
            adverse_conditions: self.adverse_conditions,
            home_terminal_timezone: self.home_terminal_timezone,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }
}

/// One duty-log entry with string fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DutyStatusRecord {
    pub start_time: String,
    pub end_time: String,
    pub status: String,
}

impl DutyStatusRecord {
    pub fn resolve(&self, tz: &Tz) -> Result<DutyInterval, HosError> {
        Ok(DutyInterval::new(
            parse_timestamp(&self.start_time, tz)?,
            parse_timestamp(&self.end_time, tz)?,
            self.status.parse::<DutyStatus>()?,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DutyLogRecord {
    pub pickup_time: String,
    pub dropoff_time: String,
    #[serde(default)]
    pub truck_type: TruckType,
    pub duty_statuses: Vec<DutyStatusRecord>,
}

impl DutyLogRecord {
    pub fn resolve(&self, tz: &Tz) -> Result<DutyLogRequest, HosError> {
        Ok(DutyLogRequest {
            pickup_time: parse_timestamp(&self.pickup_time, tz)?,
            dropoff_time: parse_timestamp(&self.dropoff_time, tz)?,
            truck_type: self.truck_type,
            duty_statuses: self
                .duty_statuses
                .iter()
                .map(|record| record.resolve(tz))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

/// Planning request. Which optional fields are present selects the mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub pickup_time: String,
    pub dropoff_time: String,
    #[serde(default)]
    pub truck_type: TruckType,
    /// Minutes of loading before driving starts.
    #[serde(default)]
    pub loading_time: Option<u32>,
    #[serde(default)]
    pub total_distance: Option<f64>,
    #[serde(default)]
    pub avg_speed: Option<f64>,
    #[serde(default)]
    pub sleeper_berth_flexibility: bool,
}

impl ScheduleRecord {
    /// Resolve into a [`PlanRequest`].
    ///
    /// `total_distance` with `avg_speed` selects distance mode; `loading_time`
    /// alone selects loading mode. Anything else is rejected.
    pub fn resolve(&self, tz: &Tz) -> Result<PlanRequest, HosError> {
        let pickup_time = parse_timestamp(&self.pickup_time, tz)?;
        let dropoff_time = parse_timestamp(&self.dropoff_time, tz)?;

        match (self.loading_time, self.total_distance, self.avg_speed) {
            (None, Some(total_distance), Some(avg_speed)) => {
                Ok(PlanRequest::Distance(DistanceTrip {
                    pickup_time,
                    dropoff_time,
                    total_distance,
                    avg_speed,
                    sleeper_berth_flexibility: self.sleeper_berth_flexibility,
                    truck_type: self.truck_type,
                }))
            }
            (Some(loading_time), None, None) => Ok(PlanRequest::Loading(LoadingTrip {
                pickup_time,
                dropoff_time,
                loading_time_minutes: loading_time,
                truck_type: self.truck_type,
            })),
            (Some(_), _, _) => Err(HosError::InvalidPlanInput(
                "give either loading_time or total_distance with avg_speed, not both".to_string(),
            )),
            (None, Some(_), None) | (None, None, Some(_)) => Err(HosError::InvalidPlanInput(
                "total_distance and avg_speed must be given together".to_string(),
            )),
            (None, None, None) => Err(HosError::InvalidPlanInput(
                "missing loading_time or total_distance with avg_speed".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(start: &str, end: &str, status: &str) -> DutyStatusRecord {
        DutyStatusRecord {
            start_time: start.to_string(),
            end_time: end.to_string(),
            status: status.to_string(),
        }
    }

    fn schedule_record() -> ScheduleRecord {
        ScheduleRecord {
            pickup_time: "2024-01-01T06:00".to_string(),
            dropoff_time: "2024-01-01T20:00".to_string(),
            truck_type: TruckType::Property,
            loading_time: None,
            total_distance: None,
            avg_speed: None,
            sleeper_berth_flexibility: false,
        }
    }

    // ── driver records ──────────────────────────────────────────────────

    #[test]
    fn test_driver_record_uses_home_terminal_zone() {
        let record = DriverRecord {
            driver_id: " D-9 ".to_string(),
            duty_status_start_time: Some("2024-01-01T06:00:00".to_string()),
            home_terminal_timezone: Some("America/Chicago".to_string()),
            ..DriverRecord::default()
        };
        let snapshot = record.resolve(&Tz::UTC).unwrap();
        assert_eq!(snapshot.driver_id, "D-9");
        assert_eq!(
            snapshot.duty_status_start_time,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_driver_record_rejects_empty_id() {
        let err = DriverRecord::default().resolve(&Tz::UTC).unwrap_err();
        assert!(matches!(err, HosError::InvalidSnapshot(_)));
    }

    #[test]
    fn test_driver_record_rejects_bad_timestamp() {
        let record = DriverRecord {
            driver_id: "D-1".to_string(),
            duty_status_start_time: Some("yesterday".to_string()),
            ..DriverRecord::default()
        };
        let err = record.resolve(&Tz::UTC).unwrap_err();
        assert!(matches!(err, HosError::InvalidDatetime(_)));
    }

    // ── duty logs ───────────────────────────────────────────────────────

    #[test]
    fn test_duty_log_record_resolves_aliases() {
        let log = DutyLogRecord {
            pickup_time: "2024-01-01T08:00".to_string(),
            dropoff_time: "2024-01-02T08:00".to_string(),
            truck_type: TruckType::Property,
            duty_statuses: vec![
                record("2024-01-01T08:00", "2024-01-01T18:00", "D"),
                record("2024-01-01T18:00", "2024-01-02T04:00", "SB"),
            ],
        };
        let request = log.resolve(&Tz::UTC).unwrap();
        assert_eq!(request.duty_statuses.len(), 2);
        assert_eq!(request.duty_statuses[0].status, DutyStatus::Driving);
        assert_eq!(request.duty_statuses[1].status, DutyStatus::SleeperBerth);
    }

    #[test]
    fn test_duty_log_record_unknown_status() {
        let log = DutyLogRecord {
            pickup_time: "2024-01-01T08:00".to_string(),
            dropoff_time: "2024-01-02T08:00".to_string(),
            truck_type: TruckType::Property,
            duty_statuses: vec![record("2024-01-01T08:00", "2024-01-01T18:00", "lunch")],
        };
        let err = log.resolve(&Tz::UTC).unwrap_err();
        assert!(matches!(err, HosError::InvalidStatus(_)));
    }

    #[test]
    fn test_duty_log_record_from_json() {
        let json = r#"{
            "pickup_time": "2024-01-01T08:00:00Z",
            "dropoff_time": "2024-01-02T08:00:00Z",
            "truck_type": "passenger",
            "duty_statuses": [
                {"start_time": "2024-01-01T08:00:00Z", "end_time": "2024-01-01T20:00:00Z", "status": "driving"}
            ]
        }"#;
        let log: DutyLogRecord = serde_json::from_str(json).unwrap();
        let request = log.resolve(&Tz::UTC).unwrap();
        assert_eq!(request.truck_type, TruckType::Passenger);
    }

    // ── schedule records ────────────────────────────────────────────────

    #[test]
    fn test_schedule_record_loading_mode() {
        let record = ScheduleRecord {
            loading_time: Some(60),
            ..schedule_record()
        };
        match record.resolve(&Tz::UTC).unwrap() {
            PlanRequest::Loading(trip) => assert_eq!(trip.loading_time_minutes, 60),
            other => panic!("expected loading mode, got {other:?}"),
        }
    }

    #[test]
    fn test_schedule_record_distance_mode() {
        let record = ScheduleRecord {
            total_distance: Some(500.0),
            avg_speed: Some(50.0),
            sleeper_berth_flexibility: true,
            ..schedule_record()
        };
        match record.resolve(&Tz::UTC).unwrap() {
            PlanRequest::Distance(trip) => {
                assert!(trip.sleeper_berth_flexibility);
                assert_eq!(trip.total_distance, 500.0);
            }
            other => panic!("expected distance mode, got {other:?}"),
        }
    }

    #[test]
    fn test_schedule_record_ambiguous_mode() {
        let record = ScheduleRecord {
            loading_time: Some(60),
            total_distance: Some(500.0),
            avg_speed: Some(50.0),
            ..schedule_record()
        };
        assert!(record.resolve(&Tz::UTC).is_err());
    }

    #[test]
    fn test_schedule_record_missing_mode() {
        let err = schedule_record().resolve(&Tz::UTC).unwrap_err().to_string();
        assert!(err.contains("missing"), "got: {err}");

        let half = ScheduleRecord {
            total_distance: Some(500.0),
            ..schedule_record()
        };
        assert!(half.resolve(&Tz::UTC).is_err());
    }

    #[test]
    fn test_schedule_record_naive_times_use_zone() {
        let record = ScheduleRecord {
            loading_time: Some(0),
            ..schedule_record()
        };
        let tz = crate::time::parse_timezone("America/New_York").unwrap();
        match record.resolve(&tz).unwrap() {
            PlanRequest::Loading(trip) => assert_eq!(
                trip.pickup_time,
                Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap()
            ),
            other => panic!("expected loading mode, got {other:?}"),
        }
    }
}
