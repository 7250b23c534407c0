//! The two inner phases of a round, shared by the point and range variants.

use super::state::{CurrentTrip, RaptorState, find_earliest_trip};
use super::Predecessor;
use crate::model::{RouteId, StopId, Time, Timetable, TripId};
use crate::routing::raptor::RaptorError;

/// Phase 2: scan each queued route from its earliest marked position,
/// riding the current trip forward and improving downstream stops.
///
/// The improvement at a stop is applied before the boarding re-evaluation,
/// and boarding always uses the previous round's label: a stop improved in
/// this round must not feed a boarding in the same round.
pub(crate) fn scan_routes(
    data: &Timetable,
    state: &mut RaptorState,
    round: usize,
    queue: &[(RouteId, usize)],
    target: Option<StopId>,
    change_time: Time,
) -> Result<(), RaptorError> {
    for &(route_id, start_pos) in queue {
        let stops = data.get_route_stops(route_id)?;
        let mut current: Option<CurrentTrip> = None;

        for (idx, &stop) in stops.iter().enumerate().skip(start_pos) {
            if let Some(trip) = current {
                let arrival = data.get_trip(route_id, trip.trip.trip)?[idx].arrival;
                if arrival < state.bound(stop, target) {
                    state.improve(
                        round,
                        stop,
                        arrival,
                        Predecessor::Ride {
                            board_time: trip.board_time,
                            board_stop: trip.board_stop,
                            alight_stop: stop,
                            arrival,
                            trip: trip.trip,
                        },
                    );
                }
            }

            // Boarding uses the label of the previous round, never the
            // improvement just applied above.
            let prev_arrival = state.arrivals[round - 1][stop];
            if prev_arrival == Time::MAX {
                continue;
            }
            let earliest_board = prev_arrival.saturating_add(change_time);
            let catch_earlier = match current {
                None => true,
                Some(trip) => {
                    earliest_board < data.get_trip(route_id, trip.trip.trip)?[idx].departure
                }
            };
            if catch_earlier {
                if let Some((trip_idx, departure)) =
                    find_earliest_trip(data, route_id, idx, earliest_board)
                {
                    current = Some(CurrentTrip {
                        trip: TripId {
                            route: route_id,
                            trip: trip_idx,
                        },
                        board_stop: stop,
                        board_time: departure,
                    });
                }
            }
        }
    }
    Ok(())
}

/// Phase 3: relax one footpath hop from every stop marked in this round.
/// Works on a snapshot of the marked set so a relaxed stop never triggers
/// further relaxations in the same round.
pub(crate) fn relax_footpaths(
    data: &Timetable,
    state: &mut RaptorState,
    round: usize,
    target: Option<StopId>,
) -> Result<(), RaptorError> {
    for stop in state.marked.snapshot() {
        let from_time = state.arrivals[round][stop];
        for &transfer in data.get_stop_transfers(stop)? {
            let arrival = from_time.saturating_add(transfer.duration);
            if arrival < state.arrivals[round][transfer.target_stop]
                && arrival < state.bound(transfer.target_stop, target)
            {
                state.improve(
                    round,
                    transfer.target_stop,
                    arrival,
                    Predecessor::Walk {
                        from_stop: stop,
                        to_stop: transfer.target_stop,
                        duration: transfer.duration,
                        arrival,
                    },
                );
            }
        }
    }
    Ok(())
}
