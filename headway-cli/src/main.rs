//! Command-line drivers for the journey planner: point queries, range
//! queries and batch OD assignment with CSV output.

mod assign;
mod query;
mod range;

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Weekday;
use clap::{Parser, Subcommand};
use headway_core::loading::{TimetableConfig, timetable_from_gtfs};
use headway_core::model::Time;
use headway_core::routing::QueryParams;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "headway", about = "Scheduled-transit journey planning")]
struct Cli {
    /// Directory with the GTFS feed (stops.txt, trips.txt, stop_times.txt,
    /// transfers.txt).
    #[arg(long)]
    gtfs: PathBuf,

    /// Restrict trips to services running on this weekday (e.g. "monday").
    #[arg(long)]
    day: Option<String>,

    /// Worker threads for batch commands; 0 keeps the rayon default.
    #[arg(long, default_value_t = 0)]
    workers: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct QueryArgs {
    /// Transfer budget.
    #[arg(long, default_value_t = 4)]
    max_transfers: usize,

    /// Allow an initial footpath from the source.
    #[arg(long)]
    walk: bool,

    /// Minimum change buffer at a stop, seconds.
    #[arg(long, default_value_t = 0)]
    change_time: Time,

    /// Log a human-readable itinerary.
    #[arg(long)]
    itinerary: bool,
}

impl QueryArgs {
    fn params(&self) -> QueryParams {
        QueryParams {
            max_transfers: self.max_transfers,
            walk_from_source: self.walk,
            change_time: self.change_time,
            print_itinerary: self.itinerary,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Point-to-point earliest-arrival query.
    Query {
        /// Source stop id (feed id).
        #[arg(long)]
        from: String,
        /// Destination stop id (feed id).
        #[arg(long)]
        to: String,
        /// Departure time, HH:MM:SS.
        #[arg(long)]
        at: String,
        /// Emit the result record as JSON instead of text.
        #[arg(long)]
        json: bool,
        /// Route through the trip-based engine instead of RAPTOR.
        #[arg(long)]
        trip_based: bool,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Range query over a departure window.
    Range {
        #[arg(long)]
        from: String,
        /// Destination stop ids; several values run the one-to-many flavour.
        #[arg(long, required = true, num_args = 1..)]
        to: Vec<String>,
        /// Window start, HH:MM:SS.
        #[arg(long)]
        start: String,
        /// Window end, HH:MM:SS.
        #[arg(long)]
        end: String,
        /// Collect covering trips instead of covering routes.
        #[arg(long)]
        trips: bool,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Batch OD queries: one CSV row per Pareto journey, with an optional
    /// logit assignment and segment occupancy on top.
    Assign {
        /// OD CSV with header origin,destination,departure_time. Omit to
        /// generate random demand.
        #[arg(long)]
        od: Option<PathBuf>,
        /// Number of random OD pairs to generate when no file is given.
        #[arg(long, default_value_t = 100)]
        demand: usize,
        /// RNG seed for demand generation and journey choice.
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Output CSV of journey rows.
        #[arg(long)]
        out: PathBuf,
        /// Also run the choice model and write per-segment occupancy here.
        #[arg(long)]
        occupancy: Option<PathBuf>,
        /// Travel-time coefficient of the choice model, per hour.
        #[arg(long, default_value_t = -0.1, allow_hyphen_values = true)]
        beta_time: f64,
        /// Transfer-count coefficient of the choice model.
        #[arg(long, default_value_t = -2.0, allow_hyphen_values = true)]
        beta_transfers: f64,
        #[command(flatten)]
        query: QueryArgs,
    },
}

/// Parse an `HH:MM:SS` clock time to seconds since midnight.
fn parse_clock(value: &str) -> Result<Time, Box<dyn Error>> {
    headway_core::loading::gtfs::parse_time(value)
        .ok_or_else(|| format!("invalid time {value:?}, expected HH:MM:SS").into())
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if cli.workers > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.workers)
            .build_global()?;
    }

    let day_of_week = cli
        .day
        .as_deref()
        .map(|day| {
            day.parse::<Weekday>()
                .map_err(|_| format!("invalid --day value {day:?}"))
        })
        .transpose()?;
    let config = TimetableConfig {
        gtfs_dir: cli.gtfs,
        day_of_week,
    };
    let data = timetable_from_gtfs(&config)?;
    info!(
        stops = data.num_stops(),
        routes = data.routes.len(),
        "timetable loaded"
    );

    match cli.command {
        Command::Query {
            from,
            to,
            at,
            json,
            trip_based,
            query,
        } => query::run(&data, &from, &to, parse_clock(&at)?, &query.params(), json, trip_based),
        Command::Range {
            from,
            to,
            start,
            end,
            trips,
            query,
        } => range::run(
            &data,
            &from,
            &to,
            (parse_clock(&start)?, parse_clock(&end)?),
            &query.params(),
            trips,
        ),
        Command::Assign {
            od,
            demand,
            seed,
            out,
            occupancy,
            beta_time,
            beta_transfers,
            query,
        } => assign::run(&data, &assign::Options {
            od,
            demand,
            seed,
            out,
            occupancy,
            beta_time,
            beta_transfers,
            params: query.params(),
        }),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
