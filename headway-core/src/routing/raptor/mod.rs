// RAPTOR (Round-Based Public Transit Optimized Router) implementations.

pub mod common;
pub mod journey;
pub mod range;
pub mod regular;

pub use common::{Predecessor, RaptorError, RaptorState};
pub use journey::{Journey, Leg, ParetoJourneys, TravelTimes, pareto_journeys};
pub use range::{CoverKind, RangeCover, one_to_many_rraptor, rraptor};
pub use regular::{earliest_arrival, raptor};
