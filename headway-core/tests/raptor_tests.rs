mod common;

use common::{TimetableBuilder, t};
use headway_core::model::Time;
use headway_core::routing::raptor::Predecessor;
use headway_core::routing::{QueryParams, earliest_arrival, raptor};

fn params(max_transfers: usize, walk: bool, change_time: Time) -> QueryParams {
    QueryParams {
        max_transfers,
        walk_from_source: walk,
        change_time,
        print_itinerary: false,
    }
}

/// Two stops on one route, a single trip 09:00 -> 09:10.
fn direct_network() -> headway_core::Timetable {
    TimetableBuilder::new(2)
        .route(&[0, 1], &[&[(t(9, 0), t(9, 0)), (t(9, 10), t(9, 10))]])
        .build()
}

/// A -> X -> B over two routes sharing X.
fn transfer_network() -> headway_core::Timetable {
    TimetableBuilder::new(3)
        .route(&[0, 1], &[&[(t(9, 0), t(9, 0)), (t(9, 15), t(9, 15))]])
        .route(&[1, 2], &[&[(t(9, 20), t(9, 20)), (t(9, 40), t(9, 40))]])
        .build()
}

#[test]
fn direct_ride() {
    let data = direct_network();
    let pareto = earliest_arrival(&data, 0, 1, t(8, 55), &params(0, false, 0))
        .unwrap()
        .expect("reachable");

    assert_eq!(pareto.journeys.len(), 1);
    assert_eq!(pareto.arrivals, vec![t(9, 10)]);
    let journey = &pareto.journeys[0];
    assert_eq!(journey.transfers, 0);
    assert_eq!(journey.legs.len(), 1);
    assert_eq!(journey.ivtt(), 600.0);
    assert_eq!(journey.wait_time(), 300.0);
    assert_eq!(journey.walk_time(), 0.0);
    assert_eq!(journey.ovtt(), 300.0);
}

#[test]
fn walk_fallback() {
    let data = TimetableBuilder::new(2).footpath(0, 1, 120).build();
    let pareto = earliest_arrival(&data, 0, 1, t(8, 0), &params(0, true, 0))
        .unwrap()
        .expect("reachable by foot");

    assert_eq!(pareto.journeys.len(), 1);
    let journey = &pareto.journeys[0];
    assert_eq!(journey.transfers, 0);
    assert_eq!(journey.legs.len(), 1);
    assert_eq!(journey.ivtt(), 0.0);
    assert_eq!(journey.walk_time(), 120.0);
    assert_eq!(journey.ovtt(), 120.0);
    assert_eq!(journey.arrival_time(), t(8, 0) + 120);
}

#[test]
fn walking_disabled_means_unreachable() {
    let data = TimetableBuilder::new(2).footpath(0, 1, 120).build();
    let result = earliest_arrival(&data, 0, 1, t(8, 0), &params(0, false, 0)).unwrap();
    assert!(result.is_none());
}

#[test]
fn one_transfer() {
    let data = transfer_network();
    let pareto = earliest_arrival(&data, 0, 2, t(8, 50), &params(1, false, 0))
        .unwrap()
        .expect("reachable with one transfer");

    assert_eq!(pareto.arrivals, vec![t(9, 40)]);
    assert_eq!(pareto.breakdowns.len(), 1);
    let (transfers, times) = pareto.breakdowns[0];
    assert_eq!(transfers, 1);
    assert_eq!(times.ivtt, 2100.0);
    assert_eq!(times.wait_time, 900.0);
    assert_eq!(times.walk_time, 0.0);
    assert_eq!(
        pareto.trip_cover,
        vec!["0_0".parse().unwrap(), "1_0".parse().unwrap()]
    );
}

#[test]
fn change_time_makes_connection_infeasible() {
    // 09:15 + 600s misses the 09:20 departure.
    let data = transfer_network();
    let result = earliest_arrival(&data, 0, 2, t(8, 50), &params(1, false, 600)).unwrap();
    assert!(result.is_none());
}

#[test]
fn change_time_within_slack_still_connects() {
    let data = transfer_network();
    let pareto = earliest_arrival(&data, 0, 2, t(8, 50), &params(1, false, 300))
        .unwrap()
        .expect("300s change fits the 5 minute slack");
    assert_eq!(pareto.arrivals, vec![t(9, 40)]);
}

#[test]
fn pareto_dominance_keeps_both_alternatives() {
    // Direct trip arriving 10:05 versus a one-transfer chain arriving 10:00.
    let data = TimetableBuilder::new(3)
        .route(&[0, 2], &[&[(t(9, 0), t(9, 0)), (t(10, 5), t(10, 5))]])
        .route(&[0, 1], &[&[(t(9, 5), t(9, 5)), (t(9, 20), t(9, 20))]])
        .route(&[1, 2], &[&[(t(9, 30), t(9, 30)), (t(10, 0), t(10, 0))]])
        .build();

    let pareto = earliest_arrival(&data, 0, 2, t(8, 55), &params(2, false, 0))
        .unwrap()
        .expect("reachable");

    // Descending round order: more transfers but earlier arrival first.
    assert_eq!(pareto.rounds_reached, vec![2, 1]);
    assert_eq!(pareto.arrivals, vec![t(10, 0), t(10, 5)]);
    let transfer_counts: Vec<usize> = pareto.journeys.iter().map(|j| j.transfers).collect();
    assert_eq!(transfer_counts, vec![1, 0]);

    // Pareto optimality: arrivals strictly improve as transfers increase.
    for pair in pareto.journeys.windows(2) {
        assert!(pair[0].transfers > pair[1].transfers);
        assert!(pair[0].arrival_time() < pair[1].arrival_time());
    }
}

#[test]
fn target_pruning_keeps_other_destinations_intact() {
    // A slow branch through stop 1 is pruned while querying stop 2, but a
    // direct query for stop 1 still sees it.
    let data = TimetableBuilder::new(3)
        .route(&[0, 2], &[&[(t(9, 0), t(9, 0)), (t(9, 30), t(9, 30))]])
        .route(&[0, 1], &[&[(t(9, 0), t(9, 0)), (t(9, 40), t(9, 40))]])
        .build();

    let to_fast = earliest_arrival(&data, 0, 2, t(8, 55), &params(2, false, 0))
        .unwrap()
        .expect("reachable");
    assert_eq!(to_fast.arrivals, vec![t(9, 30)]);

    let to_slow = earliest_arrival(&data, 0, 1, t(8, 55), &params(2, false, 0))
        .unwrap()
        .expect("reachable");
    assert_eq!(to_slow.arrivals, vec![t(9, 40)]);
}

#[test]
fn labels_respect_best_arrival_and_improve_strictly() {
    let data = transfer_network();
    let state = raptor(&data, 0, Some(2), t(8, 50), &params(3, false, 0)).unwrap();

    for stop in 0..data.num_stops() {
        let set_labels: Vec<Time> = (0..state.rounds())
            .map(|round| state.arrivals[round][stop])
            .filter(|&label| label != Time::MAX)
            .collect();
        for &label in &set_labels {
            assert!(label >= state.best_arrival[stop]);
        }
        // Later rounds only record strict improvements.
        for pair in set_labels.windows(2) {
            assert!(pair[1] < pair[0]);
        }
        if let Some(min) = set_labels.iter().min() {
            assert_eq!(*min, state.best_arrival[stop]);
        }
    }
}

#[test]
fn ride_pointers_are_boardable_from_previous_rounds() {
    let data = transfer_network();
    let change_time = 0;
    let state = raptor(&data, 0, Some(2), t(8, 50), &params(3, false, change_time)).unwrap();

    for round in 1..state.rounds() {
        for stop in 0..data.num_stops() {
            let Predecessor::Ride {
                board_time,
                board_stop,
                ..
            } = state.predecessors[round][stop]
            else {
                continue;
            };
            // The boarding stop must have a label in an earlier round that
            // makes the departure catchable.
            let feasible = (0..round).any(|earlier| {
                let label = state.arrivals[earlier][board_stop];
                label != Time::MAX && label + change_time <= board_time
            });
            assert!(feasible, "round {round} ride at stop {stop} is not boardable");
        }
    }
}

#[test]
fn repeated_queries_are_bit_identical() {
    let data = transfer_network();
    let run = || raptor(&data, 0, Some(2), t(8, 50), &params(2, false, 0)).unwrap();
    let first = run();
    let second = run();

    assert_eq!(first.arrivals, second.arrivals);
    assert_eq!(first.best_arrival, second.best_arrival);
    assert_eq!(first.predecessors, second.predecessors);
}

#[test]
fn invalid_stop_is_rejected_at_entry() {
    let data = direct_network();
    let result = earliest_arrival(&data, 0, 99, t(8, 0), &params(1, false, 0));
    assert!(result.is_err());
}

#[test]
fn later_trip_is_taken_when_first_is_missed() {
    let data = TimetableBuilder::new(2)
        .route(
            &[0, 1],
            &[
                &[(t(8, 0), t(8, 0)), (t(8, 30), t(8, 30))],
                &[(t(9, 0), t(9, 0)), (t(9, 30), t(9, 30))],
            ],
        )
        .build();

    let pareto = earliest_arrival(&data, 0, 1, t(8, 10), &params(0, false, 0))
        .unwrap()
        .expect("second trip catchable");
    assert_eq!(pareto.arrivals, vec![t(9, 30)]);
    assert_eq!(pareto.trip_cover, vec!["0_1".parse().unwrap()]);
}

#[test]
fn walk_then_ride_uses_footpath_neighbour() {
    // The route starts one footpath away from the source.
    let data = TimetableBuilder::new(3)
        .footpath_pair(0, 1, 300)
        .route(&[1, 2], &[&[(t(9, 0), t(9, 0)), (t(9, 30), t(9, 30))]])
        .build();

    let pareto = earliest_arrival(&data, 0, 2, t(8, 50), &params(1, true, 0))
        .unwrap()
        .expect("reachable via initial footpath");
    assert_eq!(pareto.arrivals, vec![t(9, 30)]);
    let journey = &pareto.journeys[0];
    assert_eq!(journey.legs.len(), 2);
    assert_eq!(journey.walk_time(), 300.0);
    // 08:50 depart, 08:55 at the stop, board 09:00.
    assert_eq!(journey.wait_time(), 300.0);
}
