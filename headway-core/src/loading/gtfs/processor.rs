use chrono::Weekday;
use hashbrown::{HashMap, HashSet};
use log::warn;

use super::{
    parser::{deserialize_gtfs_file, parse_time},
    raw_types::{FeedService, FeedStop, FeedStopTime, FeedTransfer, FeedTrip},
};
use crate::loading::config::TimetableConfig;
use crate::model::{Departure, Route, RouteId, Stop, StopId, StopTime, Timetable, Transfer, TripId};
use crate::Error;

/// Build the timetable from a GTFS-style feed directory.
///
/// Routes are grouped from `trips.txt`; every trip of a route must visit the
/// same stop sequence, times must be non-decreasing along each trip, and the
/// sorted trips must not overtake each other at any stop. Violations are
/// fatal: the routing engines rely on these preconditions and never
/// re-validate them.
pub fn timetable_from_gtfs(config: &TimetableConfig) -> Result<Timetable, Error> {
    let (stops, mut trips, mut stop_times, transfers) = load_raw_feed(config)?;

    if let Some(day) = config.day_of_week {
        let services: Vec<FeedService> =
            deserialize_gtfs_file(&config.gtfs_dir.join("calendar.txt"))?;
        filter_trips_by_service_day(day, &services, &mut trips, &mut stop_times);
    }

    // Dense stop indices in feed order.
    let stop_id_map: HashMap<String, StopId> = stops
        .iter()
        .enumerate()
        .map(|(idx, stop)| (stop.stop_id.clone(), idx))
        .collect();

    let trip_route: HashMap<&str, &str> = trips
        .iter()
        .map(|trip| (trip.trip_id.as_str(), trip.route_id.as_str()))
        .collect();

    let trip_stop_times = group_stop_times(stop_times, &stop_id_map)?;

    // Trips per feed route, in a deterministic route order.
    let mut route_trips: HashMap<&str, Vec<&str>> = HashMap::new();
    for trip_id in trip_stop_times.keys() {
        match trip_route.get(trip_id.as_str()) {
            Some(&route_id) => route_trips
                .entry(route_id)
                .or_default()
                .push(trip_id.as_str()),
            None => warn!("stop_times references unknown trip {trip_id}"),
        }
    }
    let mut route_ids: Vec<&str> = route_trips.keys().copied().collect();
    route_ids.sort_unstable_by(|a, b| match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    });

    let mut stops_vec = create_stops_vector(stops);

    let mut routes_vec: Vec<Route> = Vec::with_capacity(route_ids.len());
    let mut route_stops: Vec<StopId> = Vec::new();
    let mut stop_times_vec: Vec<StopTime> = Vec::new();

    for route_id in route_ids {
        let route = build_route(
            route_id,
            &route_trips[route_id],
            &trip_stop_times,
            &mut route_stops,
            &mut stop_times_vec,
        )?;
        routes_vec.push(route);
    }

    // Routes through each stop, deduplicated and sorted for determinism.
    let mut stop_to_routes: HashMap<StopId, HashSet<RouteId>> =
        HashMap::with_capacity(stops_vec.len());
    for (route_idx, route) in routes_vec.iter().enumerate() {
        for stop_idx in &route_stops[route.stops_start..route.stops_start + route.num_stops] {
            stop_to_routes
                .entry(*stop_idx)
                .or_default()
                .insert(route_idx);
        }
    }
    let mut stop_routes: Vec<RouteId> = Vec::new();
    for (stop_idx, stop) in stops_vec.iter_mut().enumerate() {
        stop.routes_start = stop_routes.len();
        if let Some(routes) = stop_to_routes.get(&stop_idx) {
            let mut routes: Vec<RouteId> = routes.iter().copied().collect();
            routes.sort_unstable();
            stop.routes_len = routes.len();
            stop_routes.extend(routes);
        }
    }

    let route_stop_index = build_route_stop_index(&routes_vec, &route_stops)?;

    let transfers_vec = attach_transfers(&mut stops_vec, transfers, &stop_id_map);
    let departures_vec = attach_departures(&mut stops_vec, &routes_vec, &route_stops, &stop_times_vec);

    Ok(Timetable {
        routes: routes_vec,
        route_stops,
        stop_times: stop_times_vec,
        stops: stops_vec,
        stop_routes,
        transfers: transfers_vec,
        departures: departures_vec,
        route_stop_index,
        stop_index: stop_id_map,
    })
}

type RawFeed = (
    Vec<FeedStop>,
    Vec<FeedTrip>,
    Vec<FeedStopTime>,
    Vec<FeedTransfer>,
);

fn load_raw_feed(config: &TimetableConfig) -> Result<RawFeed, Error> {
    let dir = &config.gtfs_dir;
    let stops = deserialize_gtfs_file(&dir.join("stops.txt"))?;
    let trips = deserialize_gtfs_file(&dir.join("trips.txt"))?;
    let stop_times = deserialize_gtfs_file(&dir.join("stop_times.txt"))?;
    // Footpaths are optional; a feed without transfers is a valid network.
    let transfers_path = dir.join("transfers.txt");
    let transfers = if transfers_path.exists() {
        deserialize_gtfs_file(&transfers_path)?
    } else {
        Vec::new()
    };
    Ok((stops, trips, stop_times, transfers))
}

fn filter_trips_by_service_day(
    day: Weekday,
    services: &[FeedService],
    trips: &mut Vec<FeedTrip>,
    stop_times: &mut Vec<FeedStopTime>,
) {
    let active_services: HashSet<&str> = services
        .iter()
        .filter(|service| {
            let flag = match day {
                Weekday::Mon => &service.monday,
                Weekday::Tue => &service.tuesday,
                Weekday::Wed => &service.wednesday,
                Weekday::Thu => &service.thursday,
                Weekday::Fri => &service.friday,
                Weekday::Sat => &service.saturday,
                Weekday::Sun => &service.sunday,
            };
            flag == "1"
        })
        .map(|service| service.service_id.as_str())
        .collect();

    trips.retain(|trip| active_services.contains(trip.service_id.as_str()));
    let active_trips = trips
        .iter()
        .map(|trip| trip.trip_id.as_str())
        .collect::<HashSet<&str>>();
    stop_times.retain(|stop_time| active_trips.contains(stop_time.trip_id.as_str()));
}

/// One trip's visit at one stop, resolved to dense ids and seconds.
struct TripVisit {
    stop: StopId,
    times: StopTime,
}

fn group_stop_times(
    stop_times: Vec<FeedStopTime>,
    stop_id_map: &HashMap<String, StopId>,
) -> Result<HashMap<String, Vec<TripVisit>>, Error> {
    let mut by_trip: HashMap<String, Vec<(u32, TripVisit)>> = HashMap::new();
    for row in stop_times {
        let Some(&stop) = stop_id_map.get(&row.stop_id) else {
            warn!("stop_times references unknown stop {}", row.stop_id);
            continue;
        };
        let sequence = row.stop_sequence.parse::<u32>().map_err(|e| {
            Error::InvalidData(format!("bad stop_sequence {:?}: {e}", row.stop_sequence))
        })?;
        let arrival = parse_time(&row.arrival_time).ok_or_else(|| {
            Error::InvalidData(format!("bad arrival_time {:?}", row.arrival_time))
        })?;
        let departure = parse_time(&row.departure_time).ok_or_else(|| {
            Error::InvalidData(format!("bad departure_time {:?}", row.departure_time))
        })?;
        by_trip.entry(row.trip_id).or_default().push((
            sequence,
            TripVisit {
                stop,
                times: StopTime { arrival, departure },
            },
        ));
    }

    Ok(by_trip
        .into_iter()
        .map(|(trip_id, mut visits)| {
            visits.sort_by_key(|(sequence, _)| *sequence);
            (trip_id, visits.into_iter().map(|(_, v)| v).collect())
        })
        .collect())
}

/// Assemble one route from its member trips, verifying the preconditions
/// the routing engines assume, and append its data to the flat vectors.
fn build_route(
    route_id: &str,
    trip_ids: &[&str],
    trip_stop_times: &HashMap<String, Vec<TripVisit>>,
    route_stops: &mut Vec<StopId>,
    stop_times_vec: &mut Vec<StopTime>,
) -> Result<Route, Error> {
    let mut members: Vec<(&str, &Vec<TripVisit>)> = trip_ids
        .iter()
        .map(|&trip_id| (trip_id, &trip_stop_times[trip_id]))
        .collect();

    let (first_id, first) = members[0];
    let sequence: Vec<StopId> = first.iter().map(|visit| visit.stop).collect();
    if sequence.len() < 2 {
        return Err(Error::ScheduleInconsistency(format!(
            "route {route_id}: trip {first_id} visits fewer than two stops"
        )));
    }
    let distinct: HashSet<StopId> = sequence.iter().copied().collect();
    if distinct.len() != sequence.len() {
        return Err(Error::ScheduleInconsistency(format!(
            "route {route_id}: a stop appears more than once"
        )));
    }

    for (trip_id, visits) in &members {
        if visits.iter().map(|v| v.stop).ne(sequence.iter().copied()) {
            return Err(Error::ScheduleInconsistency(format!(
                "route {route_id}: trip {trip_id} does not follow the route's stop sequence"
            )));
        }
        let mut prev_departure = 0;
        for visit in *visits {
            if visit.times.departure < visit.times.arrival || visit.times.arrival < prev_departure {
                return Err(Error::ScheduleInconsistency(format!(
                    "route {route_id}: trip {trip_id} has decreasing times"
                )));
            }
            prev_departure = visit.times.departure;
        }
    }

    // FIFO trip order: sort by departure at the first stop, then make sure
    // no trip overtakes its predecessor anywhere.
    members.sort_by_key(|(trip_id, visits)| (visits[0].times.departure, trip_id.to_string()));
    for pair in members.windows(2) {
        let (earlier_id, earlier) = pair[0];
        let (later_id, later) = pair[1];
        let overtake = earlier.iter().zip(later.iter()).any(|(u, v)| {
            u.times.arrival > v.times.arrival || u.times.departure > v.times.departure
        });
        if overtake {
            return Err(Error::ScheduleInconsistency(format!(
                "route {route_id}: trip {earlier_id} overtakes trip {later_id}"
            )));
        }
    }

    let stops_start = route_stops.len();
    let trips_start = stop_times_vec.len();
    route_stops.extend(&sequence);
    for (_, visits) in &members {
        stop_times_vec.extend(visits.iter().map(|visit| visit.times));
    }

    Ok(Route {
        num_trips: members.len(),
        num_stops: sequence.len(),
        stops_start,
        trips_start,
    })
}

fn build_route_stop_index(
    routes: &[Route],
    route_stops: &[StopId],
) -> Result<HashMap<(RouteId, StopId), usize>, Error> {
    let mut index = HashMap::new();
    for (route_idx, route) in routes.iter().enumerate() {
        let stops = &route_stops[route.stops_start..route.stops_start + route.num_stops];
        for (pos, &stop) in stops.iter().enumerate() {
            index.insert((route_idx, stop), pos);
        }
    }
    Ok(index)
}

fn create_stops_vector(stops: Vec<FeedStop>) -> Vec<Stop> {
    stops
        .into_iter()
        .map(|feed_stop| Stop {
            stop_id: feed_stop.stop_id,
            routes_start: 0,
            routes_len: 0,
            transfers_start: 0,
            transfers_len: 0,
            departures_start: 0,
            departures_len: 0,
        })
        .collect()
}

fn attach_transfers(
    stops_vec: &mut [Stop],
    transfers: Vec<FeedTransfer>,
    stop_id_map: &HashMap<String, StopId>,
) -> Vec<Transfer> {
    let mut by_stop: HashMap<StopId, Vec<Transfer>> = HashMap::new();
    for row in transfers {
        let (Some(&from), Some(&to)) = (
            stop_id_map.get(&row.from_stop_id),
            stop_id_map.get(&row.to_stop_id),
        ) else {
            warn!(
                "transfer references unknown stop ({} -> {})",
                row.from_stop_id, row.to_stop_id
            );
            continue;
        };
        if from == to {
            continue;
        }
        let duration = row.min_transfer_time.trim().parse::<u32>().unwrap_or(0);
        by_stop.entry(from).or_default().push(Transfer {
            target_stop: to,
            duration,
        });
    }

    let mut flat = Vec::new();
    for (stop_idx, stop) in stops_vec.iter_mut().enumerate() {
        stop.transfers_start = flat.len();
        if let Some(mut outgoing) = by_stop.remove(&stop_idx) {
            outgoing.sort_by_key(|t| (t.target_stop, t.duration));
            stop.transfers_len = outgoing.len();
            flat.extend(outgoing);
        }
    }
    flat
}

fn attach_departures(
    stops_vec: &mut [Stop],
    routes: &[Route],
    route_stops: &[StopId],
    stop_times: &[StopTime],
) -> Vec<Departure> {
    let mut by_stop: HashMap<StopId, Vec<Departure>> = HashMap::new();
    for (route_idx, route) in routes.iter().enumerate() {
        let stops = &route_stops[route.stops_start..route.stops_start + route.num_stops];
        for trip_idx in 0..route.num_trips {
            let trip_start = route.trips_start + trip_idx * route.num_stops;
            // The last position is excluded: nothing can be boarded there.
            for (stop_idx, &stop) in stops.iter().enumerate().take(route.num_stops - 1) {
                by_stop.entry(stop).or_default().push(Departure {
                    trip: TripId {
                        route: route_idx,
                        trip: trip_idx,
                    },
                    time: stop_times[trip_start + stop_idx].departure,
                    stop_idx,
                });
            }
        }
    }

    let mut flat = Vec::new();
    for (stop_idx, stop) in stops_vec.iter_mut().enumerate() {
        stop.departures_start = flat.len();
        if let Some(mut departures) = by_stop.remove(&stop_idx) {
            departures.sort_by_key(|d| (d.time, d.trip));
            stop.departures_len = departures.len();
            flat.extend(departures);
        }
    }
    flat
}
