// Components shared between the RAPTOR variants.
pub(crate) mod phases;
mod state;

pub use state::{MarkedStops, Predecessor, RaptorError, RaptorState};
pub(crate) use state::{CurrentTrip, collect_routes, find_earliest_trip};
