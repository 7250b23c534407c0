mod one_to_many;
pub(crate) mod range_raptor;

pub use one_to_many::one_to_many_rraptor;
pub use range_raptor::{CoverKind, RangeCover, rraptor};
