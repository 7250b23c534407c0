// Re-export of the public surface most callers need.

pub use crate::assignment::{
    AssignmentResult, ChoiceModel, ChosenJourney, OdQuery, SegmentLoads, assign, pareto_options,
    segment_occupancy,
};
pub use crate::error::Error;
pub use crate::loading::{TimetableConfig, timetable_from_gtfs};
pub use crate::model::{
    Departure, RouteId, Stop, StopId, StopTime, Time, Timetable, Transfer, TripId, format_time,
};
pub use crate::routing::{
    CoverKind, HypPartition, Journey, Leg, ParetoJourneys, QueryParams, RangeCover, RaptorError,
    TravelTimes, TripTransfers, build_trip_transfers, earliest_arrival, one_to_many_rraptor,
    pareto_journeys, raptor, rraptor, trip_based,
};
