use std::path::PathBuf;

use chrono::Weekday;
use headway_core::Error;
use headway_core::loading::{TimetableConfig, timetable_from_gtfs};
use headway_core::routing::{QueryParams, earliest_arrival};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

#[test]
fn loads_the_mini_feed() {
    let data = timetable_from_gtfs(&TimetableConfig::new(fixture("mini"))).unwrap();

    assert_eq!(data.num_stops(), 4);
    assert_eq!(data.routes.len(), 2);

    // Route 1 carries two trips in FIFO order.
    let a = data.stop_by_id("A").unwrap();
    let b = data.stop_by_id("B").unwrap();
    let first = data.get_trip(0, 0).unwrap();
    let second = data.get_trip(0, 1).unwrap();
    assert!(first[0].departure < second[0].departure);
    assert_eq!(data.get_route_stops(0).unwrap(), &[a, b]);

    // Footpaths land on the right stop.
    let c = data.stop_by_id("C").unwrap();
    let d = data.stop_by_id("D").unwrap();
    let from_c = data.get_stop_transfers(c).unwrap();
    assert_eq!(from_c.len(), 1);
    assert_eq!(from_c[0].target_stop, d);
    assert_eq!(from_c[0].duration, 120);

    // Departures are grouped per stop and sorted.
    let at_a = data.stop_departures(a).unwrap();
    assert_eq!(at_a.len(), 2);
    assert!(at_a[0].time <= at_a[1].time);
}

#[test]
fn end_to_end_query_over_the_loaded_feed() {
    let data = timetable_from_gtfs(&TimetableConfig::new(fixture("mini"))).unwrap();
    let a = data.stop_by_id("A").unwrap();
    let d = data.stop_by_id("D").unwrap();

    let params = QueryParams {
        max_transfers: 2,
        walk_from_source: false,
        change_time: 0,
        print_itinerary: false,
    };
    // A -(t11)-> B -(t21)-> C -walk-> D, arriving 09:42.
    let pareto = earliest_arrival(&data, a, d, 8 * 3600 + 50 * 60, &params)
        .unwrap()
        .expect("reachable");
    assert_eq!(pareto.arrivals, vec![9 * 3600 + 40 * 60 + 120]);
    assert_eq!(pareto.journeys[0].transfers, 1);
    assert_eq!(pareto.journeys[0].walk_time(), 120.0);
}

#[test]
fn weekend_service_filter_empties_the_feed() {
    let config = TimetableConfig {
        gtfs_dir: fixture("mini"),
        day_of_week: Some(Weekday::Sun),
    };
    let data = timetable_from_gtfs(&config).unwrap();
    assert_eq!(data.routes.len(), 0);
}

#[test]
fn weekday_service_filter_keeps_the_feed() {
    let config = TimetableConfig {
        gtfs_dir: fixture("mini"),
        day_of_week: Some(Weekday::Tue),
    };
    let data = timetable_from_gtfs(&config).unwrap();
    assert_eq!(data.routes.len(), 2);
}

#[test]
fn overtaking_trips_are_fatal() {
    let result = timetable_from_gtfs(&TimetableConfig::new(fixture("overtake")));
    match result {
        Err(Error::ScheduleInconsistency(message)) => {
            assert!(message.contains("overtakes"), "unexpected message: {message}");
        }
        other => panic!("expected a schedule inconsistency, got {other:?}"),
    }
}

#[test]
fn missing_feed_directory_is_an_io_error() {
    let result = timetable_from_gtfs(&TimetableConfig::new(fixture("does-not-exist")));
    assert!(matches!(result, Err(Error::IoError(_))));
}
