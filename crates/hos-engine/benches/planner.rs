use chrono::{Duration, TimeZone, Utc};
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use hos_engine::{
    evaluate, plan_with_distance, plan_with_loading, DistanceTrip, DriverSnapshot, LoadingTrip,
    PlannerOptions, TruckType,
};

fn bench_planner(c: &mut Criterion) {
    let pickup = Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap();
    let options = PlannerOptions::default();

    let long_haul = DistanceTrip {
        pickup_time: pickup,
        dropoff_time: pickup + Duration::days(5),
        total_distance: 2800.0,
        avg_speed: 55.0,
        sleeper_berth_flexibility: true,
        truck_type: TruckType::Property,
    };
    c.bench_function("plan_distance_long_haul", |b| {
        b.iter(|| plan_with_distance(black_box(&long_haul), black_box(&options)))
    });

    let regional = LoadingTrip {
        pickup_time: pickup,
        dropoff_time: pickup + Duration::hours(40),
        loading_time_minutes: 90,
        truck_type: TruckType::Passenger,
    };
    c.bench_function("plan_loading_regional", |b| {
        b.iter(|| plan_with_loading(black_box(&regional)))
    });

    let driver = DriverSnapshot {
        shift_drive_minutes: Some(700),
        cycle_work_minutes: Some(4300),
        sleeper_berth_time: Some(300),
        duty_status_start_time: Some(pickup),
        ..DriverSnapshot::new("D-1", TruckType::Property)
    };
    let now = pickup + Duration::hours(15);
    c.bench_function("evaluate_driver", |b| {
        b.iter(|| evaluate(black_box(&driver), black_box(now)))
    });
}

criterion_group!(benches, bench_planner);
criterion_main!(benches);
