pub mod transit;

pub use transit::{
    Departure, ParseTripIdError, Route, RouteId, Stop, StopId, StopTime, Time, Timetable, Transfer,
    TripId, format_time,
};
