pub mod parameters;

pub use parameters::{parse_string, Parameter, ParameterMap, ParameterTree};
