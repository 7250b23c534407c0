mod common;

use common::{TimetableBuilder, t};
use hashbrown::HashSet;
use headway_core::model::{Time, TripId};
use headway_core::routing::{
    CoverKind, QueryParams, RangeCover, earliest_arrival, one_to_many_rraptor, rraptor,
};

fn params(max_transfers: usize, walk: bool) -> QueryParams {
    QueryParams {
        max_transfers,
        walk_from_source: walk,
        change_time: 0,
        print_itinerary: false,
    }
}

/// One line with three departures across the morning.
fn frequent_line() -> headway_core::Timetable {
    TimetableBuilder::new(3)
        .route(
            &[0, 1, 2],
            &[
                &[(t(8, 15), t(8, 15)), (t(8, 30), t(8, 30)), (t(8, 45), t(8, 45))],
                &[(t(8, 45), t(8, 45)), (t(9, 0), t(9, 0)), (t(9, 15), t(9, 15))],
                &[(t(9, 15), t(9, 15)), (t(9, 30), t(9, 30)), (t(9, 45), t(9, 45))],
            ],
        )
        .build()
}

#[test]
fn trip_cover_matches_naive_per_departure_queries() {
    let data = frequent_line();
    let window = (t(8, 0), t(10, 0));
    let query = params(2, false);

    let cover = rraptor(&data, 0, 2, window, &query, CoverKind::Trips).unwrap();
    let RangeCover::Trips(trips) = cover else {
        panic!("asked for trips")
    };

    // No duplicates.
    let unique: HashSet<TripId> = trips.iter().copied().collect();
    assert_eq!(unique.len(), trips.len());

    // The naive union: one standard query per departure in the window.
    let mut naive: HashSet<TripId> = HashSet::new();
    for departure in data.departures_in_window(0, window).unwrap() {
        if let Some(pareto) =
            earliest_arrival(&data, 0, 2, departure.time, &query).unwrap()
        {
            naive.extend(pareto.trip_cover);
        }
    }
    assert_eq!(unique, naive);
}

#[test]
fn route_cover_collapses_trips_to_routes() {
    let data = frequent_line();
    let cover = rraptor(&data, 0, 2, (t(8, 0), t(10, 0)), &params(2, false), CoverKind::Routes)
        .unwrap();
    assert_eq!(cover, RangeCover::Routes(vec![0]));
}

#[test]
fn range_window_bounds_are_honoured() {
    let data = frequent_line();
    // Only the 08:45 departure falls inside the window.
    let cover = rraptor(&data, 0, 2, (t(8, 30), t(9, 0)), &params(2, false), CoverKind::Trips)
        .unwrap();
    assert_eq!(cover, RangeCover::Trips(vec![TripId { route: 0, trip: 1 }]));
}

#[test]
fn walking_seed_collects_neighbour_departures() {
    // The only line leaves from a stop one footpath away from the source.
    let data = TimetableBuilder::new(3)
        .footpath_pair(0, 1, 60)
        .route(&[1, 2], &[&[(t(9, 0), t(9, 0)), (t(9, 30), t(9, 30))]])
        .build();

    let without_walk = rraptor(
        &data,
        0,
        2,
        (t(8, 0), t(10, 0)),
        &params(1, false),
        CoverKind::Trips,
    )
    .unwrap();
    assert_eq!(without_walk, RangeCover::Trips(vec![]));

    let with_walk = rraptor(
        &data,
        0,
        2,
        (t(8, 0), t(10, 0)),
        &params(1, true),
        CoverKind::Trips,
    )
    .unwrap();
    assert_eq!(
        with_walk,
        RangeCover::Trips(vec![TripId { route: 0, trip: 0 }])
    );
}

#[test]
fn one_to_many_unions_destination_covers() {
    // Two branches from the source, one per destination.
    let data = TimetableBuilder::new(4)
        .route(&[0, 1], &[&[(t(9, 0), t(9, 0)), (t(9, 20), t(9, 20))]])
        .route(&[0, 2], &[&[(t(9, 5), t(9, 5)), (t(9, 25), t(9, 25))]])
        .route(&[0, 3], &[&[(t(9, 10), t(9, 10)), (t(9, 30), t(9, 30))]])
        .build();

    let cover = one_to_many_rraptor(
        &data,
        0,
        &[1, 2],
        (t(8, 0), t(10, 0)),
        &params(1, false),
        CoverKind::Trips,
    )
    .unwrap();
    let RangeCover::Trips(trips) = cover else {
        panic!("asked for trips")
    };
    let unique: HashSet<TripId> = trips.into_iter().collect();
    let expected: HashSet<TripId> = [TripId { route: 0, trip: 0 }, TripId { route: 1, trip: 0 }]
        .into_iter()
        .collect();
    // The branch to the unqueried stop 3 contributes nothing.
    assert_eq!(unique, expected);
}

#[test]
fn one_to_many_covers_transfer_chains() {
    let data = TimetableBuilder::new(4)
        .route(&[0, 1], &[&[(t(9, 0), t(9, 0)), (t(9, 15), t(9, 15))]])
        .route(&[1, 2], &[&[(t(9, 20), t(9, 20)), (t(9, 40), t(9, 40))]])
        .route(&[1, 3], &[&[(t(9, 25), t(9, 25)), (t(9, 50), t(9, 50))]])
        .build();

    let cover = one_to_many_rraptor(
        &data,
        0,
        &[2, 3],
        (t(8, 0), t(10, 0)),
        &params(2, false),
        CoverKind::Routes,
    )
    .unwrap();
    let RangeCover::Routes(routes) = cover else {
        panic!("asked for routes")
    };
    let unique: HashSet<usize> = routes.into_iter().collect();
    assert_eq!(unique, [0, 1, 2].into_iter().collect());
}

#[test]
fn shared_labels_still_cover_every_departure() {
    // A slower early trip and a faster late trip: label sharing must not
    // suppress the early trip's Pareto journey.
    let data = TimetableBuilder::new(2)
        .route(
            &[0, 1],
            &[
                &[(t(8, 0), t(8, 0)), (t(9, 0), t(9, 0))],
                &[(t(8, 30), t(8, 30)), (t(9, 30), t(9, 30))],
            ],
        )
        .build();

    let cover = rraptor(&data, 0, 1, (t(7, 30), t(9, 0)), &params(1, false), CoverKind::Trips)
        .unwrap();
    let RangeCover::Trips(trips) = cover else {
        panic!("asked for trips")
    };
    let unique: HashSet<TripId> = trips.into_iter().collect();
    let expected: HashSet<TripId> = [TripId { route: 0, trip: 0 }, TripId { route: 0, trip: 1 }]
        .into_iter()
        .collect();
    assert_eq!(unique, expected);
}
