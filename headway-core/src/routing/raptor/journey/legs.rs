//! Concrete journeys assembled from backtracking pointers, with the
//! derived walk / wait / in-vehicle time breakdown.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use crate::model::{StopId, Time, TripId, format_time};
use crate::routing::raptor::common::{Predecessor, RaptorError};

/// One step of a journey.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Leg {
    Walk {
        from_stop: StopId,
        to_stop: StopId,
        start_time: Time,
        end_time: Time,
        duration: Time,
    },
    Ride {
        from_stop: StopId,
        to_stop: StopId,
        start_time: Time,
        end_time: Time,
        duration: Time,
        trip: TripId,
    },
}

impl Leg {
    pub fn start_time(&self) -> Time {
        match self {
            Leg::Walk { start_time, .. } | Leg::Ride { start_time, .. } => *start_time,
        }
    }

    pub fn end_time(&self) -> Time {
        match self {
            Leg::Walk { end_time, .. } | Leg::Ride { end_time, .. } => *end_time,
        }
    }
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leg::Walk {
                from_stop,
                to_stop,
                duration,
                ..
            } => write!(
                f,
                "from {from_stop} walk till {to_stop} for {duration} seconds"
            ),
            Leg::Ride {
                from_stop,
                to_stop,
                start_time,
                end_time,
                trip,
                ..
            } => write!(
                f,
                "from {from_stop} board at {} and get down on {to_stop} at {} along {trip}",
                format_time(*start_time),
                format_time(*end_time)
            ),
        }
    }
}

/// Time breakdown of a journey, in seconds rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TravelTimes {
    pub walk_time: f64,
    pub wait_time: f64,
    pub ovtt: f64,
    pub ivtt: f64,
}

/// A journey: an ordered, non-empty sequence of legs plus its start time.
///
/// Without an explicit departure time the start time is inferred from the
/// first leg, which makes the initial wait zero by construction.
#[derive(Debug, Clone, Serialize)]
pub struct Journey {
    pub transfers: usize,
    pub start_time: Time,
    pub legs: Vec<Leg>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl Journey {
    /// Build a journey from an ordered pointer chain. Walk legs chain their
    /// start time from the previous leg's end; ride legs start at the
    /// recorded boarding time, so slack before a boarding is waiting time.
    pub fn assemble(
        transfers: usize,
        pointers: &[Predecessor],
        d_time: Option<Time>,
    ) -> Result<Journey, RaptorError> {
        let first = pointers.first().ok_or(RaptorError::InvalidJourney)?;
        let start_time = match d_time {
            Some(t) => t,
            None => match first {
                Predecessor::Walk {
                    duration, arrival, ..
                } => arrival.saturating_sub(*duration),
                Predecessor::Ride { board_time, .. } => *board_time,
                Predecessor::None => return Err(RaptorError::InvalidJourney),
            },
        };

        let mut legs = Vec::with_capacity(pointers.len());
        let mut cursor = start_time;
        for pointer in pointers {
            match pointer {
                Predecessor::Walk {
                    from_stop,
                    to_stop,
                    duration,
                    arrival,
                } => {
                    legs.push(Leg::Walk {
                        from_stop: *from_stop,
                        to_stop: *to_stop,
                        start_time: cursor,
                        end_time: *arrival,
                        duration: *duration,
                    });
                    cursor = *arrival;
                }
                Predecessor::Ride {
                    board_time,
                    board_stop,
                    alight_stop,
                    arrival,
                    trip,
                } => {
                    legs.push(Leg::Ride {
                        from_stop: *board_stop,
                        to_stop: *alight_stop,
                        start_time: *board_time,
                        end_time: *arrival,
                        duration: arrival.saturating_sub(*board_time),
                        trip: *trip,
                    });
                    cursor = *arrival;
                }
                Predecessor::None => return Err(RaptorError::InvalidJourney),
            }
        }

        Ok(Journey {
            transfers,
            start_time,
            legs,
        })
    }

    pub fn arrival_time(&self) -> Time {
        self.legs.last().map(Leg::end_time).unwrap_or(self.start_time)
    }

    /// Total walking time in seconds.
    pub fn walk_time(&self) -> f64 {
        let total: u64 = self
            .legs
            .iter()
            .map(|leg| match leg {
                Leg::Walk { duration, .. } => u64::from(*duration),
                Leg::Ride { .. } => 0,
            })
            .sum();
        round2(total as f64)
    }

    /// Total waiting time in seconds, charged from the journey start.
    pub fn wait_time(&self) -> f64 {
        let mut total: i64 = 0;
        let mut prev_end = self.start_time;
        for leg in &self.legs {
            total += i64::from(leg.start_time()) - i64::from(prev_end);
            prev_end = leg.end_time();
        }
        round2(total as f64)
    }

    /// Out-of-vehicle travel time: walking plus waiting.
    pub fn ovtt(&self) -> f64 {
        round2(self.walk_time() + self.wait_time())
    }

    /// In-vehicle travel time in seconds.
    pub fn ivtt(&self) -> f64 {
        let total: u64 = self
            .legs
            .iter()
            .map(|leg| match leg {
                Leg::Ride { duration, .. } => u64::from(*duration),
                Leg::Walk { .. } => 0,
            })
            .sum();
        round2(total as f64)
    }

    pub fn travel_times(&self) -> TravelTimes {
        TravelTimes {
            walk_time: self.walk_time(),
            wait_time: self.wait_time(),
            ovtt: self.ovtt(),
            ivtt: self.ivtt(),
        }
    }
}

impl fmt::Display for Journey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.legs.iter().join("\n"))
    }
}
