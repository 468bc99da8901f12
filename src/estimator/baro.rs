/// Number of samples averaged into the static-pressure bias.
pub const CALIBRATION_SAMPLES: u32 = 100;

/// Static-pressure calibration state. Accumulates a fixed window of raw
/// samples, then locks the bias for the lifetime of the process.
#[derive(Debug, Clone, PartialEq)]
pub enum BaroCalibration {
    Accumulating { sum_pa: f64, count: u32 },
    Calibrated { bias_pa: f64 },
}

impl Default for BaroCalibration {
    fn default() -> Self {
        BaroCalibration::Accumulating {
            sum_pa: 0.0,
            count: 0,
        }
    }
}

impl BaroCalibration {
    pub fn is_calibrated(&self) -> bool {
        matches!(self, BaroCalibration::Calibrated { .. })
    }

    pub fn bias_pa(&self) -> Option<f64> {
        match self {
            BaroCalibration::Calibrated { bias_pa } => Some(*bias_pa),
            BaroCalibration::Accumulating { .. } => None,
        }
    }

    /// Feeds one raw pressure sample and returns the static pressure to
    /// store. While accumulating the output is held at zero; the bias locks
    /// after exactly [`CALIBRATION_SAMPLES`] samples. Once calibrated, the
    /// signed delta (bias - raw) is clamped to within `gate_gain` of the
    /// previous output, rejecting step glitches while tracking slow drift.
    pub fn ingest(&mut self, pressure_pa: f64, prev_static_pa: f64, gate_gain: f64) -> f64 {
        match self {
            BaroCalibration::Accumulating { sum_pa, count } => {
                *sum_pa += pressure_pa;
                *count += 1;

                if *count >= CALIBRATION_SAMPLES {
                    *self = BaroCalibration::Calibrated {
                        bias_pa: *sum_pa / CALIBRATION_SAMPLES as f64,
                    };
                }

                0.0
            }
            BaroCalibration::Calibrated { bias_pa } => {
                let static_pa = *bias_pa - pressure_pa;

                static_pa.clamp(prev_static_pa - gate_gain, prev_static_pa + gate_gain)
            }
        }
    }
}
