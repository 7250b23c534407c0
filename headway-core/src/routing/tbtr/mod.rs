// Trip-based transit routing (TBTR) and its cell-restricted flavour.

mod transfers;
mod trip_based;

pub use transfers::{HypPartition, TripTransfers, build_trip_transfers};
pub use trip_based::trip_based;
