//! Backtracking from round labels to the Pareto set of journeys.

use hashbrown::HashSet;
use log::info;
use serde::Serialize;

use super::legs::{Journey, TravelTimes};
use crate::model::{StopId, Time, TripId};
use crate::routing::raptor::common::{Predecessor, RaptorError, RaptorState};

/// The Pareto-optimal journeys to one destination, ordered by descending
/// round (most transfers first), together with the rounds they were found
/// in, the set of trips needed to realise them and the per-journey time
/// breakdowns.
#[derive(Debug, Clone, Serialize)]
pub struct ParetoJourneys {
    pub rounds_reached: Vec<usize>,
    pub trip_cover: Vec<TripId>,
    pub arrivals: Vec<Time>,
    pub breakdowns: Vec<(usize, TravelTimes)>,
    pub journeys: Vec<Journey>,
}

impl ParetoJourneys {
    /// Assemble the full record from backtracked pointer chains, given in
    /// descending round order.
    pub(crate) fn from_entries(
        entries: Vec<(usize, Vec<Predecessor>)>,
        d_time: Option<Time>,
    ) -> Result<ParetoJourneys, RaptorError> {
        let mut rounds_reached = Vec::with_capacity(entries.len());
        let mut trip_cover = Vec::new();
        let mut seen_trips = HashSet::new();
        let mut arrivals = Vec::with_capacity(entries.len());
        let mut breakdowns = Vec::with_capacity(entries.len());
        let mut journeys = Vec::with_capacity(entries.len());

        for (round, pointers) in entries {
            rounds_reached.push(round);
            let transfers = round.saturating_sub(1);

            for pointer in &pointers {
                if let Predecessor::Ride { trip, .. } = pointer {
                    if seen_trips.insert(*trip) {
                        trip_cover.push(*trip);
                    }
                }
            }

            let journey = Journey::assemble(transfers, &pointers, d_time)?;
            arrivals.push(journey.arrival_time());
            breakdowns.push((transfers, journey.travel_times()));
            journeys.push(journey);
        }

        Ok(ParetoJourneys {
            rounds_reached,
            trip_cover,
            arrivals,
            breakdowns,
            journeys,
        })
    }

    /// Best-effort human-readable dump to the process log.
    pub fn log_itineraries(&self) {
        for journey in &self.journeys {
            for leg in &journey.legs {
                info!("{leg}");
            }
            info!("####################################");
        }
    }
}

/// Follow the pointer labels backwards from `(round, destination)` to the
/// source. A walk pointer stays in its round; a ride pointer consumes one.
pub(crate) fn backtrack(
    state: &RaptorState,
    round: usize,
    destination: StopId,
) -> Result<Vec<Predecessor>, RaptorError> {
    let mut pointers = Vec::new();
    let mut k = round;
    let mut stop = destination;

    loop {
        match &state.predecessors[k][stop] {
            Predecessor::None => break,
            walk @ Predecessor::Walk { from_stop, .. } => {
                let from = *from_stop;
                pointers.push(walk.clone());
                stop = from;
            }
            ride @ Predecessor::Ride { board_stop, .. } => {
                let board = *board_stop;
                pointers.push(ride.clone());
                stop = board;
                k = k.checked_sub(1).ok_or(RaptorError::InvalidJourney)?;
            }
        }
    }

    pointers.reverse();
    Ok(pointers)
}

/// Post-process the labels of a finished query into the Pareto journeys for
/// `destination`. Returns `None` when no round reached the destination.
pub fn pareto_journeys(
    state: &RaptorState,
    destination: StopId,
    d_time: Option<Time>,
) -> Result<Option<ParetoJourneys>, RaptorError> {
    if destination >= state.best_arrival.len() {
        return Err(RaptorError::InvalidStop);
    }

    let rounds_reached: Vec<usize> = (0..state.rounds())
        .filter(|&k| state.predecessors[k][destination] != Predecessor::None)
        .rev()
        .collect();
    if rounds_reached.is_empty() {
        return Ok(None);
    }

    let mut entries = Vec::with_capacity(rounds_reached.len());
    for &round in &rounds_reached {
        entries.push((round, backtrack(state, round, destination)?));
    }

    ParetoJourneys::from_entries(entries, d_time).map(Some)
}
