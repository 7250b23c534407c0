//! One-to-many range queries: one source against a destination list,
//! sharing the round scans across destinations.

use crate::model::{StopId, Time, Timetable};
use crate::routing::QueryParams;
use crate::routing::raptor::RaptorError;
use crate::routing::raptor::range::range_raptor::{
    CoverKind, RangeCover, collect_seeds, run_range,
};
use crate::routing::raptor::regular::validate_raptor_inputs;

/// Like [`rraptor`](crate::routing::raptor::range::rraptor) but against a
/// set of destinations. Without a single target there is no upper bound to
/// prune against, so pruning falls back to each stop's own best arrival;
/// post-processing unions the covers over every destination.
pub fn one_to_many_rraptor(
    data: &Timetable,
    source: StopId,
    destinations: &[StopId],
    window: (Time, Time),
    params: &QueryParams,
    cover: CoverKind,
) -> Result<RangeCover, RaptorError> {
    validate_raptor_inputs(data, source, None, window.1)?;
    for &destination in destinations {
        data.validate_stop(destination)?;
    }

    let seeds = collect_seeds(data, source, window, params.walk_from_source)?;
    run_range(data, source, destinations, None, seeds, params, cover)
}
