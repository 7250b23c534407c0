use std::fs::File;
use std::path::Path;

use log::warn;

use crate::Error;
use crate::model::Time;

pub fn deserialize_gtfs_file<T>(path: &Path) -> Result<Vec<T>, Error>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let file = File::open(path)?;
    Ok(csv::Reader::from_reader(file)
        .deserialize()
        .filter_map(|row| match row {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("skipping malformed row in {}: {e}", path.display());
                None
            }
        })
        .collect::<Vec<T>>())
}

/// Parse an `HH:MM:SS` time string to seconds since midnight. Hours may
/// exceed 24 for overnight trips.
pub fn parse_time(time_str: &str) -> Option<Time> {
    let mut parts = time_str.split(':');
    let hours = parts.next()?.trim().parse::<u32>().ok()?;
    let minutes = parts.next()?.parse::<u32>().ok()?;
    let seconds = parts.next()?.parse::<u32>().ok()?;
    if parts.next().is_some() || minutes >= 60 || seconds >= 60 {
        return None;
    }

    Some(hours * 3600 + minutes * 60 + seconds)
}
