use std::f64::consts::PI;

use nalgebra::Vector3;

use crate::estimator::{
    datatypes::{EstimatorOutput, StateEstimate},
    origin::GeodeticOrigin,
};

/// Radians to degrees, wrapped into [-180, 180]. Modulo-360 first, then one
/// correction step in each direction.
pub fn wrap_deg_180(angle_rad: f64) -> f64 {
    let mut deg = (angle_rad % (2.0 * PI)).to_degrees();

    if deg < -180.0 {
        deg += 360.0;
    }
    if deg > 180.0 {
        deg -= 360.0;
    }

    deg
}

/// Assembles the published record from a raw estimate. Position switches to
/// the down-positive vertical convention; heading and course get degree
/// twins; everything else passes through. Validity is never asserted here.
pub fn build_state(output: &EstimatorOutput, origin: Option<GeodeticOrigin>) -> StateEstimate {
    StateEstimate {
        position_ned_m: Vector3::new(output.pn_m, output.pe_m, -output.h_m),
        origin,

        va_m_s: output.va_m_s,
        alpha_rad: output.alpha_rad,
        beta_rad: output.beta_rad,
        phi_rad: output.phi_rad,
        theta_rad: output.theta_rad,
        psi_rad: output.psi_rad,
        chi_rad: output.chi_rad,
        p_rad_s: output.p_rad_s,
        q_rad_s: output.q_rad_s,
        r_rad_s: output.r_rad_s,
        vg_m_s: output.vg_m_s,
        wind_n_m_s: output.wind_n_m_s,
        wind_e_m_s: output.wind_e_m_s,

        psi_deg: wrap_deg_180(output.psi_rad),
        chi_deg: wrap_deg_180(output.chi_rad),

        quat_valid: false,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_wrap_deg_180() {
        assert_relative_eq!(wrap_deg_180(400.0f64.to_radians()), 40.0, max_relative = 1e-12);
        assert_relative_eq!(
            wrap_deg_180((-200.0f64).to_radians()),
            160.0,
            max_relative = 1e-12
        );
        assert_relative_eq!(wrap_deg_180(0.0), 0.0);
        assert_relative_eq!(wrap_deg_180(PI), 180.0);
        assert_relative_eq!(wrap_deg_180(-PI), -180.0);
        assert_relative_eq!(wrap_deg_180(90.0f64.to_radians()), 90.0, max_relative = 1e-12);
        assert_relative_eq!(
            wrap_deg_180(720.0f64.to_radians()),
            0.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_down_positive_position() {
        let output = EstimatorOutput {
            pn_m: 10.0,
            pe_m: -20.0,
            h_m: 150.0,
            ..Default::default()
        };

        let state = build_state(&output, None);

        assert_eq!(state.position_ned_m, Vector3::new(10.0, -20.0, -150.0));
        assert!(state.origin.is_none());
        assert!(!state.quat_valid);
    }

    #[test]
    fn test_origin_attached_once_established() {
        let origin = GeodeticOrigin {
            lat_deg: 40.0,
            lon_deg: -111.0,
            alt_m: 1000.0,
        };

        let state = build_state(&EstimatorOutput::default(), Some(origin));

        assert_eq!(state.origin, Some(origin));
    }

    #[test]
    fn test_passthrough_fields() {
        let output = EstimatorOutput {
            va_m_s: 17.0,
            alpha_rad: 0.05,
            beta_rad: -0.01,
            phi_rad: 0.2,
            theta_rad: 0.1,
            p_rad_s: 0.3,
            q_rad_s: -0.2,
            r_rad_s: 0.15,
            vg_m_s: 18.5,
            wind_n_m_s: 1.0,
            wind_e_m_s: -2.0,
            ..Default::default()
        };

        let state = build_state(&output, None);

        assert_eq!(state.va_m_s, 17.0);
        assert_eq!(state.alpha_rad, 0.05);
        assert_eq!(state.beta_rad, -0.01);
        assert_eq!(state.phi_rad, 0.2);
        assert_eq!(state.theta_rad, 0.1);
        assert_eq!(state.p_rad_s, 0.3);
        assert_eq!(state.q_rad_s, -0.2);
        assert_eq!(state.r_rad_s, 0.15);
        assert_eq!(state.vg_m_s, 18.5);
        assert_eq!(state.wind_n_m_s, 1.0);
        assert_eq!(state.wind_e_m_s, -2.0);
    }
}
