//! Transit data model.

pub mod data;
pub mod types;

pub use data::Timetable;
pub use types::{
    Departure, ParseTripIdError, Route, RouteId, Stop, StopId, StopTime, Time, Transfer, TripId,
    format_time,
};
