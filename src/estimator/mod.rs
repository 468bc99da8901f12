//! Sensor aggregation harness for the navigation-state estimator.
//!
//! Asynchronous GPS, IMU, barometer, airspeed and status messages are
//! validated and calibrated into a single input snapshot, which a
//! fixed-rate tick hands to the estimation algorithm. The resulting state
//! is normalized and republished every tick.

pub mod algorithm;
pub mod baro;
pub mod config;
pub mod datatypes;
pub mod ingest;
pub mod node;
pub mod origin;
pub mod publisher;

pub use algorithm::{Estimator, PassthroughEstimator};
pub use config::EstimatorConfig;
pub use datatypes::{
    AirspeedSample, BaroSample, EstimatorInput, EstimatorOutput, EstimatorParams, GpsSample,
    ImuSample, StateEstimate, StatusSample,
};
pub use node::EstimatorNode;
pub use origin::GeodeticOrigin;
