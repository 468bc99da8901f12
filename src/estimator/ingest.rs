use log::{debug, info};

use crate::estimator::{
    baro::BaroCalibration,
    datatypes::{
        AirspeedSample, BaroSample, EstimatorInput, EstimatorParams, GpsSample, ImuSample,
        StatusSample,
    },
    origin::GeodeticOrigin,
};

/// A fix below this many satellites is discarded.
pub const MIN_GPS_SATELLITES: u32 = 4;

/// Ground course is unreliable near zero speed; below this threshold the
/// previously stored course is retained.
pub const MIN_COURSE_SPEED_M_S: f64 = 0.3;

/// One-way arming latch. Once armed, estimation runs for the life of the
/// process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArmedState {
    #[default]
    Disarmed,
    Armed,
}

/// Owns the input snapshot and all per-sensor validation and calibration
/// state. Exactly one of these exists, inside the estimator node, so no
/// handler can ever race another or the tick.
#[derive(Debug, Default)]
pub struct SensorIngestor {
    params: EstimatorParams,
    input: EstimatorInput,
    origin: Option<GeodeticOrigin>,
    baro: BaroCalibration,
    armed: ArmedState,
}

impl SensorIngestor {
    pub fn new(params: EstimatorParams) -> Self {
        SensorIngestor {
            params,
            ..Default::default()
        }
    }

    pub fn params(&self) -> &EstimatorParams {
        &self.params
    }

    pub fn input(&self) -> &EstimatorInput {
        &self.input
    }

    pub fn origin(&self) -> Option<&GeodeticOrigin> {
        self.origin.as_ref()
    }

    pub fn armed(&self) -> bool {
        self.armed == ArmedState::Armed
    }

    /// Discards fixes that are invalid, see fewer than
    /// [`MIN_GPS_SATELLITES`] satellites, or carry a non-finite latitude.
    /// The first accepted fix only establishes the origin; every later one
    /// is projected onto the local tangent plane.
    pub fn handle_gps(&mut self, s: &GpsSample) {
        if !s.fix || s.num_sat < MIN_GPS_SATELLITES || !s.lat_deg.is_finite() {
            self.input.gps_new = false;
            return;
        }

        match &self.origin {
            None => {
                self.origin = Some(GeodeticOrigin {
                    lat_deg: s.lat_deg,
                    lon_deg: s.lon_deg,
                    alt_m: s.alt_m,
                });

                info!(
                    "GPS origin established at lat {:.6} deg, lon {:.6} deg, alt {:.1} m",
                    s.lat_deg, s.lon_deg, s.alt_m
                );
            }
            Some(origin) => {
                let local = origin.to_local(s.lat_deg, s.lon_deg, s.alt_m);

                self.input.gps_n_m = local.n_m;
                self.input.gps_e_m = local.e_m;
                self.input.gps_h_m = local.h_m;
                self.input.gps_vg_m_s = s.speed_m_s;

                if s.speed_m_s > MIN_COURSE_SPEED_M_S {
                    self.input.gps_course_rad = s.ground_course_rad;
                }

                self.input.gps_new = true;
            }
        }
    }

    pub fn handle_imu(&mut self, s: &ImuSample) {
        self.input.accel_m_s2 = s.accel_m_s2;
        self.input.gyro_rad_s = s.gyro_rad_s;
    }

    pub fn handle_baro(&mut self, s: &BaroSample) {
        let was_calibrated = self.baro.is_calibrated();

        self.input.static_pres_pa = self.baro.ingest(
            s.pressure_pa,
            self.input.static_pres_pa,
            self.params.baro_gate_gain(),
        );

        if !was_calibrated && self.baro.is_calibrated() {
            info!(
                "Barometer calibrated, static bias {:.1} Pa",
                self.baro.bias_pa().unwrap_or(0.0)
            );
        }
    }

    pub fn handle_airspeed(&mut self, s: &AirspeedSample) {
        self.input.diff_pres_pa = s.diff_pressure_pa;
    }

    pub fn handle_status(&mut self, s: &StatusSample) {
        self.input.status_armed = s.armed;

        if s.armed && self.armed == ArmedState::Disarmed {
            self.armed = ArmedState::Armed;
            info!("Vehicle armed, estimation enabled");
        } else if !s.armed && self.armed == ArmedState::Armed {
            debug!("Status reports disarmed, latch retained");
        }
    }

    /// Called once after every estimation tick. The edge flag is cleared
    /// whether or not the estimator observed it this cycle.
    pub fn end_of_tick(&mut self) {
        self.input.gps_new = false;
    }
}
