mod default_raptor;

pub use default_raptor::{earliest_arrival, raptor};
pub(crate) use default_raptor::validate_raptor_inputs;
