use anyhow::{ensure, Context, Result};
use chrono::TimeDelta;

use crate::{
    estimator::datatypes::{EstimatorParams, GRAVITY_M_S2},
    parameters::ParameterMap,
    utils::path::Path,
};

/// Runtime configuration, resolved once at startup. Every key is optional;
/// defaults match the reference deployment. Gravity is deliberately not
/// configurable.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorConfig {
    pub gps_topic: String,
    pub imu_topic: String,
    pub baro_topic: String,
    pub airspeed_topic: String,
    pub status_topic: String,
    pub state_topic: String,

    pub update_rate_hz: f64,
    pub params: EstimatorParams,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        EstimatorConfig {
            gps_topic: "/sensors/gps".to_string(),
            imu_topic: "/sensors/imu".to_string(),
            baro_topic: "/sensors/baro".to_string(),
            airspeed_topic: "/sensors/airspeed".to_string(),
            status_topic: "/sensors/status".to_string(),
            state_topic: "/estimator/state".to_string(),
            update_rate_hz: 100.0,
            params: EstimatorParams::default(),
        }
    }
}

impl EstimatorConfig {
    /// Resolves the configuration from the parameter tree, failing fast on
    /// mistyped values, non-positive rates, or malformed topic names.
    pub fn from_parameters(params: &ParameterMap) -> Result<EstimatorConfig> {
        let defaults = EstimatorConfig::default();

        let update_rate_hz = params.float_or("estimator.update_rate", defaults.update_rate_hz)?;
        ensure!(
            update_rate_hz > 0.0 && update_rate_hz.is_finite(),
            "estimator.update_rate must be a positive rate, got {update_rate_hz}"
        );

        let rho_kg_m3 = params.float_or("estimator.rho", defaults.params.rho_kg_m3)?;
        ensure!(
            rho_kg_m3 > 0.0,
            "estimator.rho must be a positive density, got {rho_kg_m3}"
        );

        let d = &defaults.params;
        let config = EstimatorConfig {
            gps_topic: params.string_or("estimator.gps_topic", &defaults.gps_topic)?,
            imu_topic: params.string_or("estimator.imu_topic", &defaults.imu_topic)?,
            baro_topic: params.string_or("estimator.baro_topic", &defaults.baro_topic)?,
            airspeed_topic: params
                .string_or("estimator.airspeed_topic", &defaults.airspeed_topic)?,
            status_topic: params.string_or("estimator.status_topic", &defaults.status_topic)?,
            state_topic: params.string_or("estimator.state_topic", &defaults.state_topic)?,

            update_rate_hz,
            params: EstimatorParams {
                ts_s: 1.0 / update_rate_hz,
                gravity_m_s2: GRAVITY_M_S2,
                rho_kg_m3,
                sigma_accel: params.float_or("estimator.sigma_accel", d.sigma_accel)?,
                sigma_n_gps: params.float_or("estimator.sigma_n_gps", d.sigma_n_gps)?,
                sigma_e_gps: params.float_or("estimator.sigma_e_gps", d.sigma_e_gps)?,
                sigma_vg_gps: params.float_or("estimator.sigma_vg_gps", d.sigma_vg_gps)?,
                sigma_course_gps: params
                    .float_or("estimator.sigma_course_gps", d.sigma_course_gps)?,
            },
        };

        for topic in [
            &config.gps_topic,
            &config.imu_topic,
            &config.baro_topic,
            &config.airspeed_topic,
            &config.status_topic,
            &config.state_topic,
        ] {
            Path::from_str(topic).with_context(|| format!("Invalid topic name '{topic}'"))?;
        }

        Ok(config)
    }

    pub fn period(&self) -> TimeDelta {
        TimeDelta::microseconds((1e6 / self.update_rate_hz) as i64)
    }
}
