//! Preprocessed timetable and the constant-time lookups the routing
//! engines run against.

use hashbrown::HashMap;

use super::types::{Departure, Route, RouteId, Stop, StopId, StopTime, Time, Transfer, TripId};
use crate::routing::raptor::RaptorError;

/// Immutable transit timetable in the flattened layout of the original
/// RAPTOR paper: per-entity records carry offset ranges into shared vectors.
/// Built once by the loader and shared by reference between query workers.
#[derive(Debug, Clone)]
pub struct Timetable {
    /// All routes.
    pub routes: Vec<Route>,
    /// Stop sequences of all routes, concatenated.
    pub route_stops: Vec<StopId>,
    /// Stop times of all trips, trip-major, `num_stops` entries per trip.
    pub stop_times: Vec<StopTime>,
    /// All stops.
    pub stops: Vec<Stop>,
    /// Routes through each stop, concatenated.
    pub stop_routes: Vec<RouteId>,
    /// Outgoing footpaths of each stop, concatenated.
    pub transfers: Vec<Transfer>,
    /// Boarding opportunities of each stop, concatenated, sorted by time.
    pub departures: Vec<Departure>,
    /// Position of a stop along a route, precomputed so the inner loops
    /// never scan a stop sequence.
    pub route_stop_index: HashMap<(RouteId, StopId), usize>,
    /// Source-feed stop id to dense index.
    pub stop_index: HashMap<String, StopId>,
}

impl Timetable {
    pub fn num_stops(&self) -> usize {
        self.stops.len()
    }

    /// Check that a stop index is in range.
    pub fn validate_stop(&self, stop: StopId) -> Result<(), RaptorError> {
        if stop >= self.stops.len() {
            Err(RaptorError::InvalidStop)
        } else {
            Ok(())
        }
    }

    /// Dense index for a source-feed stop id.
    pub fn stop_by_id(&self, stop_id: &str) -> Option<StopId> {
        self.stop_index.get(stop_id).copied()
    }

    /// Stops of a route, in visiting order.
    pub fn get_route_stops(&self, route_id: RouteId) -> Result<&[StopId], RaptorError> {
        self.routes
            .get(route_id)
            .ok_or(RaptorError::InvalidRoute)
            .and_then(|route| {
                let end = route.stops_start + route.num_stops;
                if end > self.route_stops.len() {
                    Err(RaptorError::InvalidRoute)
                } else {
                    Ok(&self.route_stops[route.stops_start..end])
                }
            })
    }

    /// `StopTime` slice of one trip, aligned with the route's stop sequence.
    pub fn get_trip(&self, route_id: RouteId, trip_idx: usize) -> Result<&[StopTime], RaptorError> {
        let route = self.routes.get(route_id).ok_or(RaptorError::InvalidRoute)?;

        if trip_idx >= route.num_trips {
            return Err(RaptorError::InvalidTrip);
        }

        let start = route.trips_start + trip_idx * route.num_stops;
        let end = start + route.num_stops;

        if end > self.stop_times.len() {
            Err(RaptorError::InvalidRoute)
        } else {
            Ok(&self.stop_times[start..end])
        }
    }

    /// Outgoing footpaths of a stop. Empty for stops without transfers.
    pub fn get_stop_transfers(&self, stop_id: StopId) -> Result<&[Transfer], RaptorError> {
        self.validate_stop(stop_id)?;
        let stop = &self.stops[stop_id];
        let end = stop.transfers_start + stop.transfers_len;
        if end > self.transfers.len() {
            Err(RaptorError::InvalidStop)
        } else {
            Ok(&self.transfers[stop.transfers_start..end])
        }
    }

    /// Routes through a stop. Empty for stops no route visits.
    pub fn routes_for_stop(&self, stop_idx: StopId) -> &[RouteId] {
        let start = self.stops[stop_idx].routes_start;
        let end = start + self.stops[stop_idx].routes_len;
        &self.stop_routes[start..end]
    }

    /// Position of `stop` along `route_id`.
    pub fn stop_index_on_route(&self, route_id: RouteId, stop: StopId) -> Option<usize> {
        self.route_stop_index.get(&(route_id, stop)).copied()
    }

    /// All boarding opportunities at a stop, sorted by departure time.
    pub fn stop_departures(&self, stop_id: StopId) -> Result<&[Departure], RaptorError> {
        self.validate_stop(stop_id)?;
        let stop = &self.stops[stop_id];
        let end = stop.departures_start + stop.departures_len;
        if end > self.departures.len() {
            Err(RaptorError::InvalidStop)
        } else {
            Ok(&self.departures[stop.departures_start..end])
        }
    }

    /// Boarding opportunities at a stop within `[earliest, latest]`.
    pub fn departures_in_window(
        &self,
        stop_id: StopId,
        window: (Time, Time),
    ) -> Result<&[Departure], RaptorError> {
        let departures = self.stop_departures(stop_id)?;
        let lo = departures.partition_point(|d| d.time < window.0);
        let hi = departures.partition_point(|d| d.time <= window.1);
        Ok(&departures[lo..hi])
    }

    /// Stop times of the trip named by a wire-format trip id.
    pub fn get_trip_by_id(&self, trip: TripId) -> Result<&[StopTime], RaptorError> {
        self.get_trip(trip.route, trip.trip)
    }
}
