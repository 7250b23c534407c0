//! Feed loading and timetable construction.

mod config;
pub mod gtfs;

pub use config::TimetableConfig;
pub use gtfs::timetable_from_gtfs;
