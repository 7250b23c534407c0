//! Earliest-arrival journey planning over scheduled public transit.
//!
//! The crate is organised around an immutable, preprocessed [`model::Timetable`]
//! shared by every query: the round-based engines in [`routing`] relax labels
//! against it, the journey reconstructor turns the labels into Pareto sets of
//! concrete journeys, and [`assignment`] runs batches of OD queries through a
//! worker pool with a logit choice model on top.

pub mod assignment;
pub mod error;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;

pub use error::Error;
pub use model::{RouteId, StopId, Time, Timetable, TripId};
