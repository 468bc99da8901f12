use crate::estimator::datatypes::{EstimatorInput, EstimatorOutput, EstimatorParams};

/// The estimation algorithm consumed by the harness. Called at most once
/// per tick, and only while the vehicle is armed. Implementations own any
/// filter state they need between ticks.
pub trait Estimator {
    fn estimate(&mut self, params: &EstimatorParams, input: &EstimatorInput) -> EstimatorOutput;
}

/// Direct sensor readout in lieu of a real filter: position from GPS,
/// altitude and airspeed from the pressure channels, rates straight from
/// the gyros. Useful for bench runs and end-to-end tests.
#[derive(Debug, Clone, Default)]
pub struct PassthroughEstimator;

impl Estimator for PassthroughEstimator {
    fn estimate(&mut self, params: &EstimatorParams, input: &EstimatorInput) -> EstimatorOutput {
        let h_m = input.static_pres_pa / (params.rho_kg_m3 * params.gravity_m_s2);
        let va_m_s = (2.0 * input.diff_pres_pa.max(0.0) / params.rho_kg_m3).sqrt();

        EstimatorOutput {
            pn_m: input.gps_n_m,
            pe_m: input.gps_e_m,
            h_m,
            va_m_s,
            chi_rad: input.gps_course_rad,
            psi_rad: input.gps_course_rad,
            p_rad_s: input.gyro_rad_s[0],
            q_rad_s: input.gyro_rad_s[1],
            r_rad_s: input.gyro_rad_s[2],
            vg_m_s: input.gps_vg_m_s,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_passthrough_readout() {
        let params = EstimatorParams::default();
        let input = EstimatorInput {
            static_pres_pa: 120.05, // rho * g * 10 m
            diff_pres_pa: 0.5 * params.rho_kg_m3 * 15.0 * 15.0,
            gps_n_m: 100.0,
            gps_e_m: -50.0,
            gps_vg_m_s: 16.0,
            gps_course_rad: 0.7,
            ..Default::default()
        };

        let out = PassthroughEstimator.estimate(&params, &input);

        assert_relative_eq!(out.h_m, 10.0, max_relative = 1e-9);
        assert_relative_eq!(out.va_m_s, 15.0, max_relative = 1e-9);
        assert_relative_eq!(out.pn_m, 100.0);
        assert_relative_eq!(out.pe_m, -50.0);
        assert_relative_eq!(out.vg_m_s, 16.0);
        assert_relative_eq!(out.chi_rad, 0.7);
    }

    #[test]
    fn test_negative_diff_pressure_is_clamped() {
        let out = PassthroughEstimator.estimate(
            &EstimatorParams::default(),
            &EstimatorInput {
                diff_pres_pa: -10.0,
                ..Default::default()
            },
        );

        assert_eq!(out.va_m_s, 0.0);
    }
}
