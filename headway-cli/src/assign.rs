use std::error::Error;
use std::path::PathBuf;

use headway_core::assignment::{ChoiceModel, OdQuery, sample_index, segment_occupancy};
use headway_core::model::{Timetable, format_time};
use headway_core::routing::{Journey, ParetoJourneys, QueryParams, earliest_arrival};
use indicatif::ParallelProgressIterator;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub struct Options {
    pub od: Option<PathBuf>,
    pub demand: usize,
    pub seed: u64,
    pub out: PathBuf,
    pub occupancy: Option<PathBuf>,
    pub beta_time: f64,
    pub beta_transfers: f64,
    pub params: QueryParams,
}

#[derive(Deserialize)]
struct OdRow {
    origin: String,
    destination: String,
    departure_time: String,
}

#[derive(Serialize)]
struct JourneyRow<'a> {
    origin: &'a str,
    destination: &'a str,
    departure_time: String,
    transfers: usize,
    walk_time: f64,
    wait_time: f64,
    ovtt: f64,
    ivtt: f64,
}

#[derive(Serialize)]
struct OccupancyRow<'a> {
    trip_id: String,
    from_stop: &'a str,
    to_stop: &'a str,
    passengers: u32,
}

fn read_od_file(data: &Timetable, path: &PathBuf) -> Result<Vec<OdQuery>, Box<dyn Error>> {
    let mut queries = Vec::new();
    for row in csv::Reader::from_path(path)?.deserialize() {
        let row: OdRow = row?;
        let (Some(origin), Some(destination)) = (
            data.stop_by_id(&row.origin),
            data.stop_by_id(&row.destination),
        ) else {
            warn!(
                "skipping OD pair with unknown stop ({} -> {})",
                row.origin, row.destination
            );
            continue;
        };
        let departure = headway_core::loading::gtfs::parse_time(&row.departure_time)
            .ok_or_else(|| format!("invalid departure_time {:?}", row.departure_time))?;
        queries.push(OdQuery {
            origin,
            destination,
            departure,
        });
    }
    Ok(queries)
}

/// Uniform random demand: stop pairs with whole-minute departure times.
fn random_demand(data: &Timetable, size: usize, rng: &mut StdRng) -> Vec<OdQuery> {
    (0..size)
        .map(|_| OdQuery {
            origin: rng.random_range(0..data.num_stops()),
            destination: rng.random_range(0..data.num_stops()),
            departure: rng.random_range(0..24) * 3600 + rng.random_range(0..60) * 60,
        })
        .collect()
}

pub fn run(data: &Timetable, opts: &Options) -> Result<(), Box<dyn Error>> {
    let mut rng = StdRng::seed_from_u64(opts.seed);
    let queries = match &opts.od {
        Some(path) => read_od_file(data, path)?,
        None => random_demand(data, opts.demand, &mut rng),
    };
    info!(queries = queries.len(), "running OD batch");

    let results: Vec<Option<ParetoJourneys>> = queries
        .par_iter()
        .progress_count(queries.len() as u64)
        .map(|od| {
            earliest_arrival(data, od.origin, od.destination, od.departure, &opts.params)
                .unwrap_or_else(|e| {
                    warn!(
                        "query {} -> {} failed: {e}",
                        od.origin, od.destination
                    );
                    None
                })
        })
        .collect();

    let mut writer = csv::Writer::from_path(&opts.out)?;
    let mut rows = 0usize;
    for (od, result) in queries.iter().zip(&results) {
        let Some(pareto) = result else { continue };
        for (transfers, times) in &pareto.breakdowns {
            writer.serialize(JourneyRow {
                origin: &data.stops[od.origin].stop_id,
                destination: &data.stops[od.destination].stop_id,
                departure_time: format_time(od.departure),
                transfers: *transfers,
                walk_time: times.walk_time,
                wait_time: times.wait_time,
                ovtt: times.ovtt,
                ivtt: times.ivtt,
            })?;
            rows += 1;
        }
    }
    writer.flush()?;
    info!(rows, out = %opts.out.display(), "journey rows written");

    if let Some(path) = &opts.occupancy {
        let model = ChoiceModel {
            beta_travel_time: opts.beta_time,
            beta_transfers: opts.beta_transfers,
        };
        let mut chosen: Vec<Journey> = Vec::new();
        for result in results.into_iter().flatten() {
            let mut journeys = result.journeys;
            if journeys.is_empty() {
                continue;
            }
            let utilities: Vec<f64> = journeys.iter().map(|j| model.utility(j)).collect();
            let pick = sample_index(&utilities, &mut rng);
            chosen.push(journeys.swap_remove(pick));
        }
        info!(passengers = chosen.len(), "choice model applied");

        let loads = segment_occupancy(data, &chosen)?;
        let mut entries: Vec<_> = loads
            .into_iter()
            .flat_map(|(trip, segments)| {
                segments
                    .into_iter()
                    .map(move |(segment, passengers)| (trip, segment, passengers))
            })
            .collect();
        entries.sort_by_key(|&(trip, segment, _)| (trip, segment));

        let mut writer = csv::Writer::from_path(path)?;
        for (trip, (from_stop, to_stop), passengers) in entries {
            writer.serialize(OccupancyRow {
                trip_id: trip.to_string(),
                from_stop: &data.stops[from_stop].stop_id,
                to_stop: &data.stops[to_stop].stop_id,
                passengers,
            })?;
        }
        writer.flush()?;
        info!(occupancy = %path.display(), "segment occupancy written");
    }

    Ok(())
}
