use thiserror::Error;

/// Errors raised while loading feeds and building the timetable. All of
/// these are fatal to the loader; query-time conditions are reported as
/// [`crate::routing::raptor::RaptorError`] or encoded in sentinel labels.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Schedule inconsistency: {0}")]
    ScheduleInconsistency(String),
}
