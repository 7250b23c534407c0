mod legs;
mod reconstruct;

pub use legs::{Journey, Leg, TravelTimes};
pub use reconstruct::{ParetoJourneys, pareto_journeys};
pub(crate) use reconstruct::backtrack;
