use fixedbitset::FixedBitSet;
use hashbrown::HashMap;
use thiserror::Error;

use crate::model::{RouteId, StopId, Time, Timetable, TripId};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RaptorError {
    #[error("Invalid stop ID")]
    InvalidStop,
    #[error("Invalid route ID")]
    InvalidRoute,
    #[error("Invalid trip index")]
    InvalidTrip,
    #[error("Invalid time value")]
    InvalidTime,
    #[error("Invalid journey")]
    InvalidJourney,
}

/// Provenance of a round label: how the stop was reached in that round.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Predecessor {
    #[default]
    None,
    Walk {
        from_stop: StopId,
        to_stop: StopId,
        duration: Time,
        arrival: Time,
    },
    Ride {
        board_time: Time,
        board_stop: StopId,
        alight_stop: StopId,
        arrival: Time,
        trip: TripId,
    },
}

/// Set of stops whose label improved, with O(1) insert-if-absent via a
/// presence bit per stop.
#[derive(Debug)]
pub struct MarkedStops {
    stack: Vec<StopId>,
    present: FixedBitSet,
}

impl MarkedStops {
    pub fn new(num_stops: usize) -> Self {
        MarkedStops {
            stack: Vec::new(),
            present: FixedBitSet::with_capacity(num_stops),
        }
    }

    pub fn mark(&mut self, stop: StopId) {
        if !self.present.contains(stop) {
            self.present.set(stop, true);
            self.stack.push(stop);
        }
    }

    pub fn pop(&mut self) -> Option<StopId> {
        let stop = self.stack.pop()?;
        self.present.set(stop, false);
        Some(stop)
    }

    /// Stops currently marked, in insertion order. Footpath relaxation works
    /// on a snapshot so relaxed stops never cascade within the round.
    pub fn snapshot(&self) -> Vec<StopId> {
        self.stack.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn clear(&mut self) {
        while self.pop().is_some() {}
    }
}

/// Label arrays of one query: per-round arrivals, stop-wise best arrivals
/// and per-round provenance, plus the marked set driving the next round.
#[derive(Debug)]
pub struct RaptorState {
    /// Earliest arrival per round and stop; `Time::MAX` is unreachable.
    pub arrivals: Vec<Vec<Time>>,
    /// Stop-wise best arrival over all rounds seen so far.
    pub best_arrival: Vec<Time>,
    /// Backtracking pointers per round and stop.
    pub predecessors: Vec<Vec<Predecessor>>,
    pub(crate) marked: MarkedStops,
}

impl RaptorState {
    pub fn new(num_stops: usize, rounds: usize) -> Self {
        RaptorState {
            arrivals: vec![vec![Time::MAX; num_stops]; rounds],
            best_arrival: vec![Time::MAX; num_stops],
            predecessors: vec![vec![Predecessor::None; num_stops]; rounds],
            marked: MarkedStops::new(num_stops),
        }
    }

    pub fn rounds(&self) -> usize {
        self.arrivals.len()
    }

    /// Pruning bound at a stop: the better of the stop's own best arrival
    /// and the target's, when a target is known.
    pub(crate) fn bound(&self, stop: StopId, target: Option<StopId>) -> Time {
        let target_bound = target.map_or(Time::MAX, |t| self.best_arrival[t]);
        self.best_arrival[stop].min(target_bound)
    }

    /// Record an improvement the caller has already checked against the
    /// pruning bound, and mark the stop for the next phase.
    pub(crate) fn improve(&mut self, round: usize, stop: StopId, arrival: Time, pred: Predecessor) {
        self.arrivals[round][stop] = arrival;
        self.best_arrival[stop] = arrival;
        self.predecessors[round][stop] = pred;
        self.marked.mark(stop);
    }

    /// Forget provenance and marks but keep the arrival labels. The range
    /// variant calls this between seed departures: labels carry over from
    /// later departures, journeys do not.
    pub(crate) fn reset_pointers(&mut self) {
        for round in &mut self.predecessors {
            round.fill(Predecessor::None);
        }
        self.marked.clear();
    }
}

/// The trip currently being ridden while scanning a route.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CurrentTrip {
    pub trip: TripId,
    pub board_stop: StopId,
    pub board_time: Time,
}

/// Earliest trip on `route_id` departing from stop position `stop_idx` at or
/// after `earliest_board`. Binary search over the FIFO trip order; among
/// equal departures the lowest trip index wins.
pub(crate) fn find_earliest_trip(
    data: &Timetable,
    route_id: RouteId,
    stop_idx: usize,
    earliest_board: Time,
) -> Option<(usize, Time)> {
    let route = &data.routes[route_id];
    let trips_offset = route.trips_start;
    let num_stops = route.num_stops;
    let mut low = 0;
    let mut high = route.num_trips;
    let mut result = None;
    while low < high {
        let mid = (low + high) / 2;
        let departure = data.stop_times[trips_offset + mid * num_stops + stop_idx].departure;
        if departure >= earliest_board {
            result = Some((mid, departure));
            high = mid;
        } else {
            low = mid + 1;
        }
    }
    result
}

/// Phase 1: drain the marked set into a route queue mapping each route to
/// the earliest marked position on it. Sorted by route id so scan order,
/// and therefore equal-arrival provenance, is reproducible.
pub(crate) fn collect_routes(data: &Timetable, marked: &mut MarkedStops) -> Vec<(RouteId, usize)> {
    let mut queue: HashMap<RouteId, usize> = HashMap::new();
    while let Some(stop) = marked.pop() {
        for &route in data.routes_for_stop(stop) {
            if let Some(pos) = data.stop_index_on_route(route, stop) {
                queue
                    .entry(route)
                    .and_modify(|existing| *existing = (*existing).min(pos))
                    .or_insert(pos);
            }
        }
    }
    let mut queue: Vec<(RouteId, usize)> = queue.into_iter().collect();
    queue.sort_unstable_by_key(|&(route, _)| route);
    queue
}
