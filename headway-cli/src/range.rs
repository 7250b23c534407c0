use std::error::Error;

use headway_core::model::{Time, Timetable};
use headway_core::routing::{CoverKind, QueryParams, RangeCover, one_to_many_rraptor, rraptor};

pub fn run(
    data: &Timetable,
    from: &str,
    to: &[String],
    window: (Time, Time),
    params: &QueryParams,
    trips: bool,
) -> Result<(), Box<dyn Error>> {
    let source = data
        .stop_by_id(from)
        .ok_or_else(|| format!("unknown stop id {from:?}"))?;
    let destinations = to
        .iter()
        .map(|stop_id| {
            data.stop_by_id(stop_id)
                .ok_or_else(|| format!("unknown stop id {stop_id:?}"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let cover_kind = if trips {
        CoverKind::Trips
    } else {
        CoverKind::Routes
    };
    let cover = if let [destination] = destinations[..] {
        rraptor(data, source, destination, window, params, cover_kind)?
    } else {
        one_to_many_rraptor(data, source, &destinations, window, params, cover_kind)?
    };

    match cover {
        RangeCover::Trips(trips) => {
            for trip in trips {
                println!("{trip}");
            }
        }
        RangeCover::Routes(routes) => {
            for route in routes {
                println!("{route}");
            }
        }
    }
    Ok(())
}
