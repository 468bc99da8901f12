pub mod core;
pub mod estimator;
pub mod nodes;
pub mod parameters;
pub mod telemetry;
pub mod utils;
