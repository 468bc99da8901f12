use nalgebra::Vector3;

use crate::estimator::origin::GeodeticOrigin;

/// GPS fix as delivered by the receiver driver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpsSample {
    pub fix: bool,
    pub num_sat: u32,
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub alt_m: f64,
    pub speed_m_s: f64,
    pub ground_course_rad: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImuSample {
    pub accel_m_s2: Vector3<f64>,
    pub gyro_rad_s: Vector3<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaroSample {
    pub pressure_pa: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AirspeedSample {
    pub diff_pressure_pa: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusSample {
    pub armed: bool,
}

/// Latest-value snapshot handed to the estimation algorithm each tick.
///
/// Fields are written by the sensor handlers and are only ever observed
/// between handler runs, never mid-update. `gps_new` is edge-triggered:
/// raised by a valid position fix, cleared unconditionally after every
/// estimation tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EstimatorInput {
    pub accel_m_s2: Vector3<f64>,
    pub gyro_rad_s: Vector3<f64>,

    pub static_pres_pa: f64,
    pub diff_pres_pa: f64,

    pub gps_n_m: f64,
    pub gps_e_m: f64,
    pub gps_h_m: f64,
    pub gps_vg_m_s: f64,
    pub gps_course_rad: f64,
    pub gps_new: bool,

    pub status_armed: bool,
}

/// Raw estimate produced by the algorithm. Height is up-positive here;
/// the publisher converts to the down-positive output convention.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EstimatorOutput {
    pub pn_m: f64,
    pub pe_m: f64,
    pub h_m: f64,
    pub va_m_s: f64,
    pub alpha_rad: f64,
    pub beta_rad: f64,
    pub phi_rad: f64,
    pub theta_rad: f64,
    pub psi_rad: f64,
    pub chi_rad: f64,
    pub p_rad_s: f64,
    pub q_rad_s: f64,
    pub r_rad_s: f64,
    pub vg_m_s: f64,
    pub wind_n_m_s: f64,
    pub wind_e_m_s: f64,
}

/// Published navigation-state record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateEstimate {
    /// North, east, down. Down is the negated estimated height.
    pub position_ned_m: Vector3<f64>,
    /// Geodetic reference of the local frame, once established.
    pub origin: Option<GeodeticOrigin>,

    pub va_m_s: f64,
    pub alpha_rad: f64,
    pub beta_rad: f64,
    pub phi_rad: f64,
    pub theta_rad: f64,
    pub psi_rad: f64,
    pub chi_rad: f64,
    pub p_rad_s: f64,
    pub q_rad_s: f64,
    pub r_rad_s: f64,
    pub vg_m_s: f64,
    pub wind_n_m_s: f64,
    pub wind_e_m_s: f64,

    /// Heading and course in degrees, wrapped to [-180, 180].
    pub psi_deg: f64,
    pub chi_deg: f64,

    /// This layer does not assert validity of the underlying estimate.
    pub quat_valid: bool,
}

pub const GRAVITY_M_S2: f64 = 9.8;

/// Immutable estimator tuning, fixed at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorParams {
    /// Sample period, 1/update_rate.
    pub ts_s: f64,
    pub gravity_m_s2: f64,
    pub rho_kg_m3: f64,

    // Noise sigmas, passed through to the estimation algorithm unmodified
    pub sigma_accel: f64,
    pub sigma_n_gps: f64,
    pub sigma_e_gps: f64,
    pub sigma_vg_gps: f64,
    pub sigma_course_gps: f64,
}

impl Default for EstimatorParams {
    fn default() -> Self {
        EstimatorParams {
            ts_s: 1.0 / 100.0,
            gravity_m_s2: GRAVITY_M_S2,
            rho_kg_m3: 1.225,
            sigma_accel: 0.0245,
            sigma_n_gps: 0.21,
            sigma_e_gps: 0.21,
            sigma_vg_gps: 0.05,
            sigma_course_gps: 0.0045,
        }
    }
}

impl EstimatorParams {
    /// Clamp band for the barometric rate gate.
    pub fn baro_gate_gain(&self) -> f64 {
        1.35 * self.rho_kg_m3 * self.gravity_m_s2
    }
}
