pub const EARTH_RADIUS_M: f64 = 6378145.0;

/// Geodetic reference of the local tangent plane. Captured from the first
/// valid GPS fix and never moved afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodeticOrigin {
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub alt_m: f64,
}

/// Position in the local frame, up-positive height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalPosition {
    pub n_m: f64,
    pub e_m: f64,
    pub h_m: f64,
}

impl GeodeticOrigin {
    /// Equirectangular projection onto the tangent plane at the origin.
    /// Valid only near the origin; no re-centering is ever performed.
    pub fn to_local(&self, lat_deg: f64, lon_deg: f64, alt_m: f64) -> LocalPosition {
        LocalPosition {
            n_m: EARTH_RADIUS_M * (lat_deg - self.lat_deg).to_radians(),
            e_m: EARTH_RADIUS_M * self.lat_deg.to_radians().cos()
                * (lon_deg - self.lon_deg).to_radians(),
            h_m: alt_m - self.alt_m,
        }
    }
}
