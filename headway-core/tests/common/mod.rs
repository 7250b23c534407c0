//! Programmatic timetable construction for the integration suites.

#![allow(dead_code)]

use hashbrown::HashMap;

use headway_core::model::{
    Departure, Route, RouteId, Stop, StopId, StopTime, Time, Timetable, Transfer, TripId,
};

/// Seconds since midnight from hours and minutes.
pub fn t(hours: u32, minutes: u32) -> Time {
    hours * 3600 + minutes * 60
}

#[derive(Default)]
pub struct TimetableBuilder {
    num_stops: usize,
    routes: Vec<(Vec<StopId>, Vec<Vec<StopTime>>)>,
    footpaths: Vec<(StopId, StopId, Time)>,
}

impl TimetableBuilder {
    pub fn new(num_stops: usize) -> Self {
        TimetableBuilder {
            num_stops,
            ..Default::default()
        }
    }

    /// Add a route. `trips` are `(arrival, departure)` pairs aligned with
    /// `stops`, already in FIFO order.
    pub fn route(mut self, stops: &[StopId], trips: &[&[(Time, Time)]]) -> Self {
        let trips = trips
            .iter()
            .map(|trip| {
                assert_eq!(trip.len(), stops.len(), "trip must cover every stop");
                trip.iter()
                    .map(|&(arrival, departure)| StopTime { arrival, departure })
                    .collect()
            })
            .collect();
        self.routes.push((stops.to_vec(), trips));
        self
    }

    /// Directed footpath.
    pub fn footpath(mut self, from: StopId, to: StopId, duration: Time) -> Self {
        self.footpaths.push((from, to, duration));
        self
    }

    /// Footpath in both directions.
    pub fn footpath_pair(self, a: StopId, b: StopId, duration: Time) -> Self {
        self.footpath(a, b, duration).footpath(b, a, duration)
    }

    pub fn build(self) -> Timetable {
        let mut routes = Vec::new();
        let mut route_stops: Vec<StopId> = Vec::new();
        let mut stop_times: Vec<StopTime> = Vec::new();
        for (stops, trips) in &self.routes {
            routes.push(Route {
                num_trips: trips.len(),
                num_stops: stops.len(),
                stops_start: route_stops.len(),
                trips_start: stop_times.len(),
            });
            route_stops.extend(stops);
            for trip in trips {
                stop_times.extend(trip);
            }
        }

        let mut stops_vec: Vec<Stop> = (0..self.num_stops)
            .map(|idx| Stop {
                stop_id: idx.to_string(),
                routes_start: 0,
                routes_len: 0,
                transfers_start: 0,
                transfers_len: 0,
                departures_start: 0,
                departures_len: 0,
            })
            .collect();

        let mut routes_by_stop: Vec<Vec<RouteId>> = vec![Vec::new(); self.num_stops];
        for (route_idx, (stops, _)) in self.routes.iter().enumerate() {
            for &stop in stops {
                if !routes_by_stop[stop].contains(&route_idx) {
                    routes_by_stop[stop].push(route_idx);
                }
            }
        }
        let mut stop_routes = Vec::new();
        for (stop_idx, mut incident) in routes_by_stop.into_iter().enumerate() {
            incident.sort_unstable();
            stops_vec[stop_idx].routes_start = stop_routes.len();
            stops_vec[stop_idx].routes_len = incident.len();
            stop_routes.extend(incident);
        }

        let mut transfers_by_stop: Vec<Vec<Transfer>> = vec![Vec::new(); self.num_stops];
        for &(from, to, duration) in &self.footpaths {
            transfers_by_stop[from].push(Transfer {
                target_stop: to,
                duration,
            });
        }
        let mut transfers = Vec::new();
        for (stop_idx, mut outgoing) in transfers_by_stop.into_iter().enumerate() {
            outgoing.sort_by_key(|transfer| (transfer.target_stop, transfer.duration));
            stops_vec[stop_idx].transfers_start = transfers.len();
            stops_vec[stop_idx].transfers_len = outgoing.len();
            transfers.extend(outgoing);
        }

        let mut departures_by_stop: Vec<Vec<Departure>> = vec![Vec::new(); self.num_stops];
        for (route_idx, (stops, trips)) in self.routes.iter().enumerate() {
            for (trip_idx, trip) in trips.iter().enumerate() {
                for (stop_idx, &stop) in stops.iter().enumerate().take(stops.len() - 1) {
                    departures_by_stop[stop].push(Departure {
                        trip: TripId {
                            route: route_idx,
                            trip: trip_idx,
                        },
                        time: trip[stop_idx].departure,
                        stop_idx,
                    });
                }
            }
        }
        let mut departures = Vec::new();
        for (stop_idx, mut boardings) in departures_by_stop.into_iter().enumerate() {
            boardings.sort_by_key(|departure| (departure.time, departure.trip));
            stops_vec[stop_idx].departures_start = departures.len();
            stops_vec[stop_idx].departures_len = boardings.len();
            departures.extend(boardings);
        }

        let mut route_stop_index = HashMap::new();
        for (route_idx, (stops, _)) in self.routes.iter().enumerate() {
            for (pos, &stop) in stops.iter().enumerate() {
                route_stop_index.insert((route_idx, stop), pos);
            }
        }
        let stop_index = stops_vec
            .iter()
            .enumerate()
            .map(|(idx, stop)| (stop.stop_id.clone(), idx))
            .collect();

        Timetable {
            routes,
            route_stops,
            stop_times,
            stops: stops_vec,
            stop_routes,
            transfers,
            departures,
            route_stop_index,
            stop_index,
        }
    }
}
