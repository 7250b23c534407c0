//! Core identifier and record types for the timetable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Seconds since midnight of the service day. GTFS times run past 24:00:00
/// for overnight trips, so this is not bounded by a day.
pub type Time = u32;

/// Dense stop index assigned by the loader.
pub type StopId = usize;

/// Dense route index assigned by the loader.
pub type RouteId = usize;

/// A trip is addressed by its route and its position in the route's trip
/// order. The wire encoding is `"<route>_<trip>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TripId {
    pub route: RouteId,
    pub trip: usize,
}

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.route, self.trip)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("malformed trip id")]
pub struct ParseTripIdError;

impl FromStr for TripId {
    type Err = ParseTripIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (route, trip) = s.split_once('_').ok_or(ParseTripIdError)?;
        Ok(TripId {
            route: route.parse().map_err(|_| ParseTripIdError)?,
            trip: trip.parse().map_err(|_| ParseTripIdError)?,
        })
    }
}

impl Serialize for TripId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TripId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Arrival and departure of one trip at one stop along its route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopTime {
    pub arrival: Time,
    pub departure: Time,
}

/// A route groups trips that visit the same ordered stop sequence. Stop and
/// trip data live in the timetable's flat vectors; a route only carries the
/// offsets into them.
#[derive(Debug, Clone)]
pub struct Route {
    pub num_trips: usize,
    pub num_stops: usize,
    pub stops_start: usize,
    pub trips_start: usize,
}

/// A stop with its adjacency ranges into the timetable's flat vectors.
#[derive(Debug, Clone)]
pub struct Stop {
    /// Identifier from the source feed.
    pub stop_id: String,
    pub routes_start: usize,
    pub routes_len: usize,
    pub transfers_start: usize,
    pub transfers_len: usize,
    pub departures_start: usize,
    pub departures_len: usize,
}

/// Directed walking edge to another stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub target_stop: StopId,
    pub duration: Time,
}

/// One boarding opportunity at a stop: a trip departing at `time` from
/// position `stop_idx` of its route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Departure {
    pub trip: TripId,
    pub time: Time,
    pub stop_idx: usize,
}

/// Render seconds-since-midnight as `HH:MM:SS` (hours may exceed 24).
pub fn format_time(t: Time) -> String {
    format!("{:02}:{:02}:{:02}", t / 3600, t % 3600 / 60, t % 60)
}
