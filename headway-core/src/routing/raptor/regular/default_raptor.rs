use log::debug;

use crate::model::{StopId, Time, Timetable};
use crate::routing::QueryParams;
use crate::routing::raptor::common::{Predecessor, RaptorError, RaptorState, collect_routes};
use crate::routing::raptor::common::phases::{relax_footpaths, scan_routes};
use crate::routing::raptor::journey::{ParetoJourneys, pareto_journeys};

pub(crate) fn validate_raptor_inputs(
    data: &Timetable,
    source: StopId,
    target: Option<StopId>,
    departure_time: Time,
) -> Result<(), RaptorError> {
    data.validate_stop(source)?;
    if let Some(target_stop) = target {
        data.validate_stop(target_stop)?;
    }
    if departure_time > 86400 * 2 {
        return Err(RaptorError::InvalidTime);
    }

    Ok(())
}

/// Run the round-based relaxation from `source` departing at `departure`
/// and return the full label arrays.
///
/// Round 0 seeds the source (and, when walking from the source is enabled,
/// its one-footpath neighbours); each following round extends journeys by
/// one transit leg, so a `max_transfers` budget of T runs ride rounds
/// `1..=T+1`. The engine is total on valid inputs: unreachable stops keep
/// the `Time::MAX` sentinel.
pub fn raptor(
    data: &Timetable,
    source: StopId,
    target: Option<StopId>,
    departure: Time,
    params: &QueryParams,
) -> Result<RaptorState, RaptorError> {
    validate_raptor_inputs(data, source, target, departure)?;

    let rounds = params.max_transfers + 2;
    let mut state = RaptorState::new(data.num_stops(), rounds);

    state.arrivals[0][source] = departure;
    state.best_arrival[source] = departure;
    state.marked.mark(source);

    if params.walk_from_source {
        for &transfer in data.get_stop_transfers(source)? {
            let arrival = departure.saturating_add(transfer.duration);
            state.improve(
                0,
                transfer.target_stop,
                arrival,
                Predecessor::Walk {
                    from_stop: source,
                    to_stop: transfer.target_stop,
                    duration: transfer.duration,
                    arrival,
                },
            );
        }
    }

    for round in 1..rounds {
        let queue = collect_routes(data, &mut state.marked);
        scan_routes(data, &mut state, round, &queue, target, params.change_time)?;
        relax_footpaths(data, &mut state, round, target)?;

        if state.marked.is_empty() {
            debug!("round {round}: no stops marked, stopping early");
            break;
        }
    }

    Ok(state)
}

/// Point-to-point earliest-arrival query: run the rounds, then backtrack
/// the destination's labels into the Pareto set of journeys.
///
/// `None` means the destination cannot be reached within the transfer
/// budget.
pub fn earliest_arrival(
    data: &Timetable,
    source: StopId,
    destination: StopId,
    departure: Time,
    params: &QueryParams,
) -> Result<Option<ParetoJourneys>, RaptorError> {
    let state = raptor(data, source, Some(destination), departure, params)?;
    let result = pareto_journeys(&state, destination, Some(departure))?;

    if params.print_itinerary {
        match &result {
            Some(pareto) => pareto.log_itineraries(),
            None => log::info!("destination cannot be reached with the given transfer budget"),
        }
    }

    Ok(result)
}
