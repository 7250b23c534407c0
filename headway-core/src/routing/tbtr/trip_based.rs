//! Trip-based routing (TBTR): enumerate trip segments instead of routes.
//!
//! Each round scans a queue of trip segments. A segment can finish the
//! journey through the last-leg table of the destination, or hand over to
//! other trips through the precomputed transfer table; the `entered` map
//! keeps only the earliest entry position per trip, which is the
//! dominance rule that keeps the queues small.

use hashbrown::HashMap;

use super::transfers::{HypPartition, TripTransfers};
use crate::model::{RouteId, StopId, Time, Timetable, TripId};
use crate::routing::QueryParams;
use crate::routing::raptor::common::{Predecessor, RaptorError, find_earliest_trip};
use crate::routing::raptor::journey::ParetoJourneys;
use crate::routing::raptor::regular::validate_raptor_inputs;

/// Alighting option that ends a journey: leave the route at `alight_idx`
/// and walk `walk` seconds to the destination (zero when the route serves
/// the destination directly).
#[derive(Debug, Clone, Copy)]
struct LastLeg {
    alight_idx: usize,
    walk: Time,
}

/// Whether the best label's journey ends with a footpath.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkTail {
    None,
    Walk { duration: Time },
}

#[derive(Debug, Clone, Copy)]
struct ParentLink {
    /// Arena index of the segment this one was entered from.
    segment: usize,
    /// Alight position on the parent's trip where the transfer was taken.
    alight_idx: usize,
}

/// A queued trip segment: positions `[from_idx, to_idx)` of one trip.
#[derive(Debug, Clone, Copy)]
struct Segment {
    route: RouteId,
    trip_idx: usize,
    from_idx: usize,
    to_idx: usize,
    parent: Option<ParentLink>,
    /// Footpath duration from the source to the boarding stop, for seeds
    /// reached by an initial walk.
    lead_walk: Option<Time>,
}

/// Best arrival with at most `n` transfers, plus enough provenance to
/// rebuild the journey.
#[derive(Debug, Clone, Copy)]
struct Best {
    arrival: Time,
    provenance: Option<(usize, usize, WalkTail)>,
}

/// Point-to-point query through the trip-based engine. Produces the same
/// record as [`earliest_arrival`](crate::routing::raptor::earliest_arrival).
///
/// The change buffer is baked into `transfers` at precomputation time; an
/// optional `partition` restricts expansion to the trips admitted for the
/// source/destination cell pair.
pub fn trip_based(
    data: &Timetable,
    source: StopId,
    destination: StopId,
    departure: Time,
    params: &QueryParams,
    transfers: &TripTransfers,
    partition: Option<&HypPartition>,
) -> Result<Option<ParetoJourneys>, RaptorError> {
    validate_raptor_inputs(data, source, Some(destination), departure)?;

    let allowed = partition.and_then(|p| p.trips_between(source, destination));
    let last_legs = build_last_legs(data, destination)?;

    let mut arena: Vec<Segment> = Vec::new();
    let mut queues: Vec<Vec<usize>> = vec![Vec::new(); params.max_transfers + 1];
    let mut entered: HashMap<TripId, usize> = HashMap::new();
    let mut best = vec![
        Best {
            arrival: Time::MAX,
            provenance: None,
        };
        params.max_transfers + 1
    ];

    seed_from_source(
        data,
        source,
        departure,
        params,
        &mut arena,
        &mut queues,
        &mut entered,
    )?;

    for n in 0..=params.max_transfers {
        let entries = std::mem::take(&mut queues[n]);
        for seg_id in entries {
            let Segment {
                route,
                trip_idx,
                from_idx,
                to_idx,
                ..
            } = arena[seg_id];
            let times = data.get_trip(route, trip_idx)?;

            if let Some(options) = last_legs.get(&route) {
                for option in options {
                    if option.alight_idx > from_idx && option.alight_idx < to_idx {
                        let arrival =
                            times[option.alight_idx].arrival.saturating_add(option.walk);
                        if arrival < best[n].arrival {
                            let tail = if option.walk == 0 {
                                WalkTail::None
                            } else {
                                WalkTail::Walk {
                                    duration: option.walk,
                                }
                            };
                            update_best(&mut best, n, arrival, seg_id, option.alight_idx, tail);
                        }
                    }
                }
            }

            // Expand unless even the next stop cannot beat the bound.
            if n < params.max_transfers
                && from_idx + 1 < to_idx
                && times[from_idx + 1].arrival < best[n].arrival
            {
                let trip = TripId {
                    route,
                    trip: trip_idx,
                };
                for alight_idx in (from_idx + 1)..to_idx {
                    for &(next, board_idx) in transfers.transfers_from(trip, alight_idx) {
                        if let Some(allowed) = allowed {
                            if !allowed.contains(&next) {
                                continue;
                            }
                        }
                        enqueue(
                            data,
                            &mut arena,
                            &mut queues,
                            &mut entered,
                            n + 1,
                            next,
                            board_idx,
                            Some(ParentLink {
                                segment: seg_id,
                                alight_idx,
                            }),
                            None,
                        )?;
                    }
                }
            }
        }
    }

    let mut entries: Vec<(usize, Vec<Predecessor>)> = Vec::new();
    for n in (0..=params.max_transfers).rev() {
        if best[n].arrival == Time::MAX {
            continue;
        }
        // Only rounds that strictly beat every fewer-transfer label are
        // Pareto entries; equal labels were propagated, not earned.
        if n > 0 && best[n - 1].arrival <= best[n].arrival {
            continue;
        }
        let Some((segment, alight_idx, tail)) = best[n].provenance else {
            continue;
        };
        let pointers = build_pointers(
            data,
            &arena,
            segment,
            alight_idx,
            tail,
            source,
            destination,
            departure,
        )?;
        entries.push((n + 1, pointers));
    }

    if entries.is_empty() {
        return Ok(None);
    }
    let result = ParetoJourneys::from_entries(entries, Some(departure))?;
    if params.print_itinerary {
        result.log_itineraries();
    }
    Ok(Some(result))
}

/// Alighting options per route, derived from the destination itself and
/// from the footpaths around it (the feed's footpath table is symmetric, so
/// outgoing edges double as incoming ones).
fn build_last_legs(
    data: &Timetable,
    destination: StopId,
) -> Result<HashMap<RouteId, Vec<LastLeg>>, RaptorError> {
    let mut table: HashMap<RouteId, Vec<LastLeg>> = HashMap::new();

    for &route in data.routes_for_stop(destination) {
        if let Some(alight_idx) = data.stop_index_on_route(route, destination) {
            table
                .entry(route)
                .or_default()
                .push(LastLeg { alight_idx, walk: 0 });
        }
    }
    for &transfer in data.get_stop_transfers(destination)? {
        for &route in data.routes_for_stop(transfer.target_stop) {
            if let Some(alight_idx) = data.stop_index_on_route(route, transfer.target_stop) {
                table.entry(route).or_default().push(LastLeg {
                    alight_idx,
                    walk: transfer.duration,
                });
            }
        }
    }

    for options in table.values_mut() {
        options.sort_by_key(|option| (option.alight_idx, option.walk));
    }
    Ok(table)
}

#[allow(clippy::too_many_arguments)]
fn seed_from_source(
    data: &Timetable,
    source: StopId,
    departure: Time,
    params: &QueryParams,
    arena: &mut Vec<Segment>,
    queues: &mut [Vec<usize>],
    entered: &mut HashMap<TripId, usize>,
) -> Result<(), RaptorError> {
    for &route in data.routes_for_stop(source) {
        if let Some(board_idx) = data.stop_index_on_route(route, source) {
            if let Some((trip_idx, _)) = find_earliest_trip(data, route, board_idx, departure) {
                enqueue(
                    data,
                    arena,
                    queues,
                    entered,
                    0,
                    TripId {
                        route,
                        trip: trip_idx,
                    },
                    board_idx,
                    None,
                    None,
                )?;
            }
        }
    }

    if params.walk_from_source {
        for &transfer in data.get_stop_transfers(source)? {
            let ready = departure.saturating_add(transfer.duration);
            for &route in data.routes_for_stop(transfer.target_stop) {
                if let Some(board_idx) = data.stop_index_on_route(route, transfer.target_stop) {
                    if let Some((trip_idx, _)) = find_earliest_trip(data, route, board_idx, ready)
                    {
                        enqueue(
                            data,
                            arena,
                            queues,
                            entered,
                            0,
                            TripId {
                                route,
                                trip: trip_idx,
                            },
                            board_idx,
                            None,
                            Some(transfer.duration),
                        )?;
                    }
                }
            }
        }
    }

    Ok(())
}

/// Queue a trip entered at `board_idx` for `round`, bounded by the earliest
/// position the trip was entered from before. Entering at or after that
/// position is dominated and dropped.
#[allow(clippy::too_many_arguments)]
fn enqueue(
    data: &Timetable,
    arena: &mut Vec<Segment>,
    queues: &mut [Vec<usize>],
    entered: &mut HashMap<TripId, usize>,
    round: usize,
    trip: TripId,
    board_idx: usize,
    parent: Option<ParentLink>,
    lead_walk: Option<Time>,
) -> Result<(), RaptorError> {
    if round >= queues.len() {
        return Ok(());
    }
    let num_stops = data.get_route_stops(trip.route)?.len();
    if board_idx + 1 >= num_stops {
        return Ok(());
    }
    let bound = entered.get(&trip).copied().unwrap_or(num_stops);
    if board_idx >= bound {
        return Ok(());
    }

    arena.push(Segment {
        route: trip.route,
        trip_idx: trip.trip,
        from_idx: board_idx,
        to_idx: bound,
        parent,
        lead_walk,
    });
    queues[round].push(arena.len() - 1);
    entered.insert(trip, board_idx);
    Ok(())
}

fn update_best(
    best: &mut [Best],
    round: usize,
    arrival: Time,
    segment: usize,
    alight_idx: usize,
    tail: WalkTail,
) {
    for slot in &mut best[round..] {
        if arrival < slot.arrival {
            *slot = Best {
                arrival,
                provenance: Some((segment, alight_idx, tail)),
            };
        }
    }
}

/// Rebuild the pointer chain of a finished journey by walking the parent
/// links from the final segment back to the seed.
#[allow(clippy::too_many_arguments)]
fn build_pointers(
    data: &Timetable,
    arena: &[Segment],
    leaf: usize,
    final_alight_idx: usize,
    tail: WalkTail,
    source: StopId,
    destination: StopId,
    departure: Time,
) -> Result<Vec<Predecessor>, RaptorError> {
    let mut chain = vec![leaf];
    while let Some(link) = arena[*chain.last().ok_or(RaptorError::InvalidJourney)?].parent {
        chain.push(link.segment);
    }
    chain.reverse();

    let mut pointers = Vec::new();

    let root = &arena[chain[0]];
    if let Some(duration) = root.lead_walk {
        let board_stop = data.get_route_stops(root.route)?[root.from_idx];
        pointers.push(Predecessor::Walk {
            from_stop: source,
            to_stop: board_stop,
            duration,
            arrival: departure.saturating_add(duration),
        });
    }

    for (pos, &seg_id) in chain.iter().enumerate() {
        let segment = &arena[seg_id];
        let stops = data.get_route_stops(segment.route)?;
        let times = data.get_trip(segment.route, segment.trip_idx)?;

        let alight_idx = match chain.get(pos + 1) {
            Some(&child_id) => {
                arena[child_id]
                    .parent
                    .ok_or(RaptorError::InvalidJourney)?
                    .alight_idx
            }
            None => final_alight_idx,
        };
        let board_stop = stops[segment.from_idx];
        let alight_stop = stops[alight_idx];
        let arrival = times[alight_idx].arrival;
        pointers.push(Predecessor::Ride {
            board_time: times[segment.from_idx].departure,
            board_stop,
            alight_stop,
            arrival,
            trip: TripId {
                route: segment.route,
                trip: segment.trip_idx,
            },
        });

        if let Some(&child_id) = chain.get(pos + 1) {
            let child = &arena[child_id];
            let child_board = data.get_route_stops(child.route)?[child.from_idx];
            if child_board != alight_stop {
                let duration = data
                    .get_stop_transfers(alight_stop)?
                    .iter()
                    .find(|t| t.target_stop == child_board)
                    .map(|t| t.duration)
                    .ok_or(RaptorError::InvalidJourney)?;
                pointers.push(Predecessor::Walk {
                    from_stop: alight_stop,
                    to_stop: child_board,
                    duration,
                    arrival: arrival.saturating_add(duration),
                });
            }
        } else if let WalkTail::Walk { duration } = tail {
            pointers.push(Predecessor::Walk {
                from_stop: alight_stop,
                to_stop: destination,
                duration,
                arrival: arrival.saturating_add(duration),
            });
        }
    }

    Ok(pointers)
}
