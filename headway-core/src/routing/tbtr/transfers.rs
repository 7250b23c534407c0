//! Trip-to-trip transfer precomputation for the trip-based engine.

use hashbrown::{HashMap, HashSet};

use crate::model::{StopId, Time, Timetable, TripId};
use crate::routing::raptor::RaptorError;
use crate::routing::raptor::common::find_earliest_trip;

/// Precomputed table of useful trip-to-trip transfers: for a trip and a
/// stop position along it, the `(next_trip, board_position)` pairs worth
/// considering after alighting there.
#[derive(Debug, Clone, Default)]
pub struct TripTransfers {
    map: HashMap<TripId, HashMap<usize, Vec<(TripId, usize)>>>,
}

impl TripTransfers {
    pub fn new() -> Self {
        TripTransfers::default()
    }

    pub fn insert(&mut self, from: TripId, from_idx: usize, to: TripId, to_idx: usize) {
        self.map
            .entry(from)
            .or_default()
            .entry(from_idx)
            .or_default()
            .push((to, to_idx));
    }

    pub fn transfers_from(&self, trip: TripId, stop_idx: usize) -> &[(TripId, usize)] {
        self.map
            .get(&trip)
            .and_then(|by_idx| by_idx.get(&stop_idx))
            .map_or(&[], Vec::as_slice)
    }

    /// Number of trips with at least one outgoing transfer.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Stop-cell partition for the cell-restricted (HypTBTR) flavour: each stop
/// belongs to a cell, and each cell pair carries the set of trips a journey
/// between those cells may use.
#[derive(Debug, Clone)]
pub struct HypPartition {
    pub stop_cells: HashMap<StopId, i64>,
    pub trip_groups: HashMap<(i64, i64), HashSet<TripId>>,
}

impl HypPartition {
    /// Trip set admitted for journeys between the cells of `a` and `b`.
    pub fn trips_between(&self, a: StopId, b: StopId) -> Option<&HashSet<TripId>> {
        let cell_a = *self.stop_cells.get(&a)?;
        let cell_b = *self.stop_cells.get(&b)?;
        let key = if cell_a <= cell_b {
            (cell_a, cell_b)
        } else {
            (cell_b, cell_a)
        };
        self.trip_groups.get(&key)
    }
}

/// Generate the transfer table from the timetable's footpaths: after
/// alighting a trip, the earliest catchable trip on every route through the
/// same stop and through each one-footpath neighbour.
///
/// `change_time` is baked into the table, so the trip-based engine applies
/// no further buffer at query time.
pub fn build_trip_transfers(
    data: &Timetable,
    change_time: Time,
) -> Result<TripTransfers, RaptorError> {
    let mut table = TripTransfers::new();

    for (route_id, route) in data.routes.iter().enumerate() {
        let stops = data.get_route_stops(route_id)?;
        for trip_idx in 0..route.num_trips {
            let trip = TripId {
                route: route_id,
                trip: trip_idx,
            };
            let times = data.get_trip(route_id, trip_idx)?;

            for alight_idx in 1..route.num_stops {
                let alight_stop = stops[alight_idx];
                let arrival = times[alight_idx].arrival;

                let mut candidates: Vec<(StopId, Time)> =
                    vec![(alight_stop, arrival.saturating_add(change_time))];
                for &transfer in data.get_stop_transfers(alight_stop)? {
                    candidates.push((
                        transfer.target_stop,
                        arrival
                            .saturating_add(transfer.duration)
                            .saturating_add(change_time),
                    ));
                }

                for (board_stop, ready) in candidates {
                    for &next_route in data.routes_for_stop(board_stop) {
                        let Some(board_idx) = data.stop_index_on_route(next_route, board_stop)
                        else {
                            continue;
                        };
                        if board_idx + 1 >= data.routes[next_route].num_stops {
                            continue;
                        }
                        let Some((next_trip_idx, _)) =
                            find_earliest_trip(data, next_route, board_idx, ready)
                        else {
                            continue;
                        };
                        // Staying on the same route with a not-earlier trip
                        // cannot improve any downstream arrival.
                        if next_route == route_id && next_trip_idx >= trip_idx {
                            continue;
                        }
                        table.insert(
                            trip,
                            alight_idx,
                            TripId {
                                route: next_route,
                                trip: next_trip_idx,
                            },
                            board_idx,
                        );
                    }
                }
            }
        }
    }

    Ok(table)
}
