//! Range queries (rRAPTOR): one run over a whole departure window.
//!
//! Seed departures are processed from latest to earliest while the arrival
//! labels are shared across iterations, so each earlier departure inherits
//! an already-tight pruning bound. Pointer labels and the marked set are
//! per-iteration: labels carry over, journeys do not.

use hashbrown::HashSet;
use log::debug;

use crate::model::{RouteId, StopId, Time, Timetable, TripId, format_time};
use crate::routing::QueryParams;
use crate::routing::raptor::common::phases::{relax_footpaths, scan_routes};
use crate::routing::raptor::common::{Predecessor, RaptorError, RaptorState, collect_routes};
use crate::routing::raptor::journey::backtrack;
use crate::routing::raptor::regular::validate_raptor_inputs;

/// What a range query collects from the Pareto journeys it uncovers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverKind {
    /// The routes needed to realise every Pareto journey.
    Routes,
    /// The trips needed to realise every Pareto journey.
    Trips,
}

/// Deduplicated cover over all seed departures (and destinations).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeCover {
    Routes(Vec<RouteId>),
    Trips(Vec<TripId>),
}

/// One candidate departure event: a trip leaving `entry` at `time` from
/// position `stop_idx` of its route. `walk` is set when the entry stop is
/// reached by a footpath from the source.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Seed {
    trip: TripId,
    time: Time,
    stop_idx: usize,
    entry: StopId,
    walk: Option<Time>,
}

/// Range query between two stops over `[window.0, window.1]`.
pub fn rraptor(
    data: &Timetable,
    source: StopId,
    destination: StopId,
    window: (Time, Time),
    params: &QueryParams,
    cover: CoverKind,
) -> Result<RangeCover, RaptorError> {
    validate_raptor_inputs(data, source, Some(destination), window.1)?;
    let seeds = collect_seeds(data, source, window, params.walk_from_source)?;
    run_range(
        data,
        source,
        &[destination],
        Some(destination),
        seeds,
        params,
        cover,
    )
}

/// Every departure from `source` (and its one-footpath neighbours, when
/// walking is allowed) within the window, latest first.
pub(crate) fn collect_seeds(
    data: &Timetable,
    source: StopId,
    window: (Time, Time),
    walk_from_source: bool,
) -> Result<Vec<Seed>, RaptorError> {
    let mut seeds: Vec<Seed> = data
        .departures_in_window(source, window)?
        .iter()
        .map(|d| Seed {
            trip: d.trip,
            time: d.time,
            stop_idx: d.stop_idx,
            entry: source,
            walk: None,
        })
        .collect();

    if walk_from_source {
        for &transfer in data.get_stop_transfers(source)? {
            for d in data.departures_in_window(transfer.target_stop, window)? {
                seeds.push(Seed {
                    trip: d.trip,
                    time: d.time,
                    stop_idx: d.stop_idx,
                    entry: transfer.target_stop,
                    walk: Some(transfer.duration),
                });
            }
        }
    }

    seeds.sort_by(|a, b| {
        b.time
            .cmp(&a.time)
            .then(a.trip.cmp(&b.trip))
            .then(a.entry.cmp(&b.entry))
    });
    Ok(seeds)
}

/// Shared runner for the range variants. `target` carries the pruning bound
/// (dropped by one-to-many); `destinations` drives post-processing.
pub(crate) fn run_range(
    data: &Timetable,
    source: StopId,
    destinations: &[StopId],
    target: Option<StopId>,
    seeds: Vec<Seed>,
    params: &QueryParams,
    cover: CoverKind,
) -> Result<RangeCover, RaptorError> {
    let rounds = params.max_transfers + 2;
    let mut state = RaptorState::new(data.num_stops(), rounds);

    let mut covered_trips: Vec<TripId> = Vec::new();
    let mut covered_routes: Vec<RouteId> = Vec::new();
    let mut seen_trips: HashSet<TripId> = HashSet::new();
    let mut seen_routes: HashSet<RouteId> = HashSet::new();

    for seed in seeds {
        state.reset_pointers();
        debug!(
            "seeding departure {} of trip {} at stop {}",
            format_time(seed.time),
            seed.trip,
            seed.entry
        );

        if seed.entry == source {
            state.arrivals[0][source] = seed.time;
            state.best_arrival[source] = seed.time;
            state.marked.mark(source);
        } else {
            // The entry label is pinned to the trip's departure minus the
            // change buffer; the footpath's recorded duration does not
            // move it.
            let entry_time = seed.time.saturating_sub(params.change_time);
            state.arrivals[0][seed.entry] = entry_time;
            state.best_arrival[seed.entry] = entry_time;
            state.predecessors[0][seed.entry] = Predecessor::Walk {
                from_stop: source,
                to_stop: seed.entry,
                duration: seed.walk.unwrap_or(0),
                arrival: entry_time,
            };
            state.marked.mark(seed.entry);
        }

        for round in 1..rounds {
            let queue = if round == 1 {
                // The seed pins the first boarding, so phase 1 collapses to
                // injecting the seed trip's route directly.
                state.marked.clear();
                vec![(seed.trip.route, seed.stop_idx)]
            } else {
                collect_routes(data, &mut state.marked)
            };
            scan_routes(data, &mut state, round, &queue, target, params.change_time)?;
            relax_footpaths(data, &mut state, round, target)?;

            if state.marked.is_empty() {
                break;
            }
        }

        for &destination in destinations {
            for round in (0..rounds).rev() {
                if state.predecessors[round][destination] == Predecessor::None {
                    continue;
                }
                for pointer in backtrack(&state, round, destination)? {
                    let Predecessor::Ride { trip, .. } = pointer else {
                        continue;
                    };
                    match cover {
                        CoverKind::Trips => {
                            if seen_trips.insert(trip) {
                                covered_trips.push(trip);
                            }
                        }
                        CoverKind::Routes => {
                            if seen_routes.insert(trip.route) {
                                covered_routes.push(trip.route);
                            }
                        }
                    }
                }
            }
        }
    }

    Ok(match cover {
        CoverKind::Trips => RangeCover::Trips(covered_trips),
        CoverKind::Routes => RangeCover::Routes(covered_routes),
    })
}
