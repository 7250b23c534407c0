//! Batch OD assignment: Pareto options per OD pair, a logit choice among
//! them, and the resulting per-segment occupancy.

mod choice;
mod occupancy;

use log::warn;
use rand::Rng;
use rayon::prelude::*;

use crate::model::{StopId, Time, Timetable};
use crate::routing::raptor::RaptorError;
use crate::routing::{Journey, QueryParams, earliest_arrival};

pub use choice::{ChoiceModel, sample_index};
pub use occupancy::{SegmentLoads, segment_occupancy};

/// One demand unit: a passenger wanting to travel at `departure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OdQuery {
    pub origin: StopId,
    pub destination: StopId,
    pub departure: Time,
}

/// The journey picked for one OD query.
#[derive(Debug, Clone)]
pub struct ChosenJourney {
    pub query: OdQuery,
    pub journey: Journey,
}

/// Everything the batch produces: the per-passenger choices and the
/// aggregated segment loads.
#[derive(Debug, Clone)]
pub struct AssignmentResult {
    pub chosen: Vec<ChosenJourney>,
    pub loads: SegmentLoads,
}

/// Pareto journey options for every OD query, computed across the rayon
/// pool. The timetable is immutable, so workers share it without
/// synchronisation. Failed or unreachable queries yield `None`.
pub fn pareto_options(
    data: &Timetable,
    queries: &[OdQuery],
    params: &QueryParams,
) -> Vec<Option<Vec<Journey>>> {
    queries
        .par_iter()
        .map(|od| match earliest_arrival(data, od.origin, od.destination, od.departure, params) {
            Ok(result) => result.map(|pareto| pareto.journeys),
            Err(e) => {
                warn!(
                    "query {} -> {} at {} failed: {e}",
                    od.origin, od.destination, od.departure
                );
                None
            }
        })
        .collect()
}

/// Run the whole assignment: compute options, sample one journey per
/// reachable OD pair with the logit model, and aggregate segment loads.
/// Unreachable pairs contribute nothing.
pub fn assign<R: Rng>(
    data: &Timetable,
    queries: &[OdQuery],
    params: &QueryParams,
    model: &ChoiceModel,
    rng: &mut R,
) -> Result<AssignmentResult, RaptorError> {
    let options = pareto_options(data, queries, params);

    let mut chosen = Vec::new();
    for (query, journeys) in queries.iter().zip(options) {
        let Some(journeys) = journeys else { continue };
        if journeys.is_empty() {
            continue;
        }
        let utilities: Vec<f64> = journeys.iter().map(|j| model.utility(j)).collect();
        let pick = sample_index(&utilities, rng);
        chosen.push(ChosenJourney {
            query: *query,
            journey: journeys.into_iter().nth(pick).ok_or(RaptorError::InvalidJourney)?,
        });
    }

    let journeys: Vec<Journey> = chosen.iter().map(|c| c.journey.clone()).collect();
    let loads = segment_occupancy(data, &journeys)?;

    Ok(AssignmentResult { chosen, loads })
}
