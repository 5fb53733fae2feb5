/// Speed of light in km.s⁻¹
pub const SPEED_OF_LIGHT_KM_S: f64 = 299_792.458;

/// Mean spherical Earth radius (kilometers)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// WGS84 authalic mean Earth radius (kilometers)
pub const WGS84_AUTHALIC_RADIUS_KM: f64 = 6371.0088;

/// Geostationary satellite altitude above the surface (kilometers)
pub const GEO_ALTITUDE_KM: f64 = 35_786.0;

/// Scales a MAD to an equivalent standard deviation under normality
pub const MAD_NORMAL_SCALE: f64 = 1.4826;

/// Fixed timing correction applied to raw values reported on the
/// R600 alternate channel (microseconds)
pub const R600_BIAS_US: f64 = 4600.0;
