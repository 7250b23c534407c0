//! Query engines and their drivers.

pub mod raptor;
pub mod tbtr;

use crate::model::Time;

/// Knobs shared by every query flavour.
#[derive(Debug, Clone, Copy)]
pub struct QueryParams {
    /// Transfer budget: journeys may use up to `max_transfers + 1` transit
    /// legs.
    pub max_transfers: usize,
    /// Allow an initial footpath from the source.
    pub walk_from_source: bool,
    /// Minimum buffer between alighting and boarding at a stop, seconds.
    pub change_time: Time,
    /// Dump a human-readable itinerary to the process log.
    pub print_itinerary: bool,
}

impl Default for QueryParams {
    fn default() -> Self {
        QueryParams {
            max_transfers: 4,
            walk_from_source: false,
            change_time: 0,
            print_itinerary: false,
        }
    }
}

pub use raptor::{
    CoverKind, Journey, Leg, ParetoJourneys, RangeCover, RaptorError, TravelTimes,
    earliest_arrival, one_to_many_rraptor, pareto_journeys, raptor, rraptor,
};
pub use tbtr::{HypPartition, TripTransfers, build_trip_transfers, trip_based};
