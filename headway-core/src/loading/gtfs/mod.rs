pub mod parser;
pub mod processor;
pub mod raw_types;

pub use parser::parse_time;
pub use processor::timetable_from_gtfs;
