use std::path::PathBuf;

use chrono::Weekday;

/// Where and how to read the timetable feed.
#[derive(Debug, Clone, Default)]
pub struct TimetableConfig {
    /// Directory holding `stops.txt`, `trips.txt`, `stop_times.txt` and
    /// (optionally) `transfers.txt` and `calendar.txt`.
    pub gtfs_dir: PathBuf,
    /// Restrict trips to services running on this day of the week. `None`
    /// keeps every trip, which is what the preprocessed research feeds want.
    pub day_of_week: Option<Weekday>,
}

impl TimetableConfig {
    pub fn new(gtfs_dir: impl Into<PathBuf>) -> Self {
        TimetableConfig {
            gtfs_dir: gtfs_dir.into(),
            day_of_week: None,
        }
    }
}
