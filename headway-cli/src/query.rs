use std::error::Error;

use headway_core::model::{Time, Timetable, format_time};
use headway_core::routing::{
    QueryParams, build_trip_transfers, earliest_arrival, trip_based,
};
use tracing::info;

fn resolve_stop(data: &Timetable, stop_id: &str) -> Result<usize, Box<dyn Error>> {
    data.stop_by_id(stop_id)
        .ok_or_else(|| format!("unknown stop id {stop_id:?}").into())
}

pub fn run(
    data: &Timetable,
    from: &str,
    to: &str,
    at: Time,
    params: &QueryParams,
    json: bool,
    use_trip_based: bool,
) -> Result<(), Box<dyn Error>> {
    let source = resolve_stop(data, from)?;
    let destination = resolve_stop(data, to)?;

    let result = if use_trip_based {
        let transfers = build_trip_transfers(data, params.change_time)?;
        info!(trips = transfers.len(), "trip transfer table built");
        trip_based(data, source, destination, at, params, &transfers, None)?
    } else {
        earliest_arrival(data, source, destination, at, params)?
    };

    let Some(pareto) = result else {
        println!("destination cannot be reached with the given transfer budget");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&pareto)?);
        return Ok(());
    }

    for ((transfers, times), arrival) in pareto.breakdowns.iter().zip(&pareto.arrivals) {
        println!(
            "arrive {} with {} transfer(s): walk {}s, wait {}s, ovtt {}s, ivtt {}s",
            format_time(*arrival),
            transfers,
            times.walk_time,
            times.wait_time,
            times.ovtt,
            times.ivtt
        );
    }
    println!(
        "covering trips: {}",
        pareto
            .trip_cover
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}
