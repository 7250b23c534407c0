//! Per-segment passenger counts over chosen journeys.

use hashbrown::HashMap;

use crate::model::{StopId, Timetable, TripId};
use crate::routing::raptor::RaptorError;
use crate::routing::{Journey, Leg};

/// `loads[trip][(a, b)]` is the number of passengers riding `trip` over the
/// consecutive stop pair `(a, b)` of its route.
pub type SegmentLoads = HashMap<TripId, HashMap<(StopId, StopId), u32>>;

/// Aggregate every ride leg of `journeys` into per-segment counts. A leg
/// from its boarding stop to its alighting stop loads every consecutive
/// stop pair between the two positions on the route.
pub fn segment_occupancy(
    data: &Timetable,
    journeys: &[Journey],
) -> Result<SegmentLoads, RaptorError> {
    let mut loads: SegmentLoads = HashMap::new();

    for journey in journeys {
        for leg in &journey.legs {
            let Leg::Ride {
                from_stop,
                to_stop,
                trip,
                ..
            } = leg
            else {
                continue;
            };
            let stops = data.get_route_stops(trip.route)?;
            let board = data
                .stop_index_on_route(trip.route, *from_stop)
                .ok_or(RaptorError::InvalidJourney)?;
            let alight = data
                .stop_index_on_route(trip.route, *to_stop)
                .ok_or(RaptorError::InvalidJourney)?;
            if alight <= board {
                return Err(RaptorError::InvalidJourney);
            }

            let segments = loads.entry(*trip).or_default();
            for window in stops[board..=alight].windows(2) {
                *segments.entry((window[0], window[1])).or_insert(0) += 1;
            }
        }
    }

    Ok(loads)
}
