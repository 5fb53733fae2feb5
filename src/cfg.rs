use crate::constants::{
    EARTH_RADIUS_KM, GEO_ALTITUDE_KM, SPEED_OF_LIGHT_KM_S, WGS84_AUTHALIC_RADIUS_KM,
};

#[cfg(feature = "serde")]
use serde::Deserialize;

/// Earth radius model used for ground ranging.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub enum EarthModel {
    /// Mean spherical radius, 6371.0 km
    Spherical,
    /// WGS84 authalic mean radius, 6371.0088 km
    #[default]
    Wgs84Authalic,
}

impl EarthModel {
    /// Reference radius [km] for this model
    pub fn radius_km(&self) -> f64 {
        match self {
            Self::Spherical => EARTH_RADIUS_KM,
            Self::Wgs84Authalic => WGS84_AUTHALIC_RADIUS_KM,
        }
    }
}

impl std::fmt::Display for EarthModel {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Spherical => write!(fmt, "spherical"),
            Self::Wgs84Authalic => write!(fmt, "wgs84-authalic"),
        }
    }
}

fn default_speed_of_light() -> f64 {
    SPEED_OF_LIGHT_KM_S
}

fn default_sat_alt_km() -> f64 {
    GEO_ALTITUDE_KM
}

fn default_bto_bias_us() -> f64 {
    0.0
}

fn default_range_scale() -> f64 {
    1.0
}

fn default_ground_range_scale() -> f64 {
    1.0
}

fn default_ground_range_offset_km() -> f64 {
    0.0
}

fn default_time_window_minutes() -> f64 {
    20.0
}

fn default_distance_tolerance_km() -> f64 {
    250.0
}

fn default_curve_samples() -> usize {
    64
}

fn default_z_threshold() -> f64 {
    3.5
}

fn default_min_group_count() -> usize {
    5
}

fn default_rare_max_count() -> usize {
    1
}

/// Calibration metadata driving ping arc reconstruction.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct ArcCalibration {
    /// Speed of light [km/s]
    #[cfg_attr(feature = "serde", serde(default = "default_speed_of_light"))]
    pub speed_of_light_km_s: f64,
    /// Earth radius model for ground ranging
    #[cfg_attr(feature = "serde", serde(default))]
    pub earth_model: EarthModel,
    /// Satellite altitude above the surface [km]
    #[cfg_attr(feature = "serde", serde(default = "default_sat_alt_km"))]
    pub sat_alt_km: f64,
    /// Bias added to every raw two-way timing value [µs]
    #[cfg_attr(feature = "serde", serde(default = "default_bto_bias_us"))]
    pub bto_bias_us: f64,
    /// Multiplier applied to the slant range
    #[cfg_attr(feature = "serde", serde(default = "default_range_scale"))]
    pub range_scale: f64,
    /// Affine scale applied to the ground range
    #[cfg_attr(feature = "serde", serde(default = "default_ground_range_scale"))]
    pub ground_range_scale: f64,
    /// Affine offset applied to the ground range [km]
    #[cfg_attr(feature = "serde", serde(default = "default_ground_range_offset_km"))]
    pub ground_range_offset_km: f64,
}

impl Default for ArcCalibration {
    fn default() -> Self {
        Self {
            speed_of_light_km_s: default_speed_of_light(),
            earth_model: EarthModel::default(),
            sat_alt_km: default_sat_alt_km(),
            bto_bias_us: default_bto_bias_us(),
            range_scale: default_range_scale(),
            ground_range_scale: default_ground_range_scale(),
            ground_range_offset_km: default_ground_range_offset_km(),
        }
    }
}

/// Time and distance gates for link/arc matching.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct MatchCriteria {
    /// Symmetric time window around the arc's nominal time [minutes]
    #[cfg_attr(feature = "serde", serde(default = "default_time_window_minutes"))]
    pub time_window_minutes: f64,
    /// Maximal closest approach of a link path to the arc circle [km]
    #[cfg_attr(feature = "serde", serde(default = "default_distance_tolerance_km"))]
    pub distance_tolerance_km: f64,
    /// Samples per interpolated geodesic
    #[cfg_attr(feature = "serde", serde(default = "default_curve_samples"))]
    pub curve_samples: usize,
}

impl Default for MatchCriteria {
    fn default() -> Self {
        Self {
            time_window_minutes: default_time_window_minutes(),
            distance_tolerance_km: default_distance_tolerance_km(),
            curve_samples: default_curve_samples(),
        }
    }
}

/// Opt-in policy keeping links whose group or source endpoint is so
/// sparsely sampled that no robust score can exist.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct RarePolicy {
    /// Maximal (source, destination, band) sample count to qualify
    #[cfg_attr(feature = "serde", serde(default = "default_rare_max_count"))]
    pub max_group_count: usize,
    /// Maximal source endpoint sample count to qualify
    #[cfg_attr(feature = "serde", serde(default = "default_rare_max_count"))]
    pub max_source_count: usize,
}

impl Default for RarePolicy {
    fn default() -> Self {
        Self {
            max_group_count: default_rare_max_count(),
            max_source_count: default_rare_max_count(),
        }
    }
}

/// Robust statistical scoring parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct AnomalyCriteria {
    /// |z| at or above which a measure is flagged
    #[cfg_attr(feature = "serde", serde(default = "default_z_threshold"))]
    pub z_threshold: f64,
    /// Minimal group sample count before falling back to the band
    /// scope baseline
    #[cfg_attr(feature = "serde", serde(default = "default_min_group_count"))]
    pub min_group_count: usize,
    /// Rare-link handling, disabled unless set
    #[cfg_attr(feature = "serde", serde(default))]
    pub rare: Option<RarePolicy>,
}

impl Default for AnomalyCriteria {
    fn default() -> Self {
        Self {
            z_threshold: default_z_threshold(),
            min_group_count: default_min_group_count(),
            rare: None,
        }
    }
}

/// Complete engine configuration, immutable once the correlator is
/// built.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct Config {
    /// Arc reconstruction calibration
    #[cfg_attr(feature = "serde", serde(default))]
    pub calibration: ArcCalibration,
    /// Arc matching gates
    #[cfg_attr(feature = "serde", serde(default))]
    pub matching: MatchCriteria,
    /// Statistical scoring parameters
    #[cfg_attr(feature = "serde", serde(default))]
    pub anomaly: AnomalyCriteria,
}

#[cfg(test)]
mod test {
    use super::{Config, EarthModel};

    #[test]
    fn default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.calibration.earth_model, EarthModel::Wgs84Authalic);
        assert_eq!(cfg.calibration.sat_alt_km, 35_786.0);
        assert_eq!(cfg.matching.time_window_minutes, 20.0);
        assert_eq!(cfg.matching.distance_tolerance_km, 250.0);
        assert_eq!(cfg.anomaly.z_threshold, 3.5);
        assert_eq!(cfg.anomaly.min_group_count, 5);
        assert!(cfg.anomaly.rare.is_none());
    }

    #[test]
    fn earth_model_radius() {
        assert_eq!(EarthModel::Spherical.radius_km(), 6371.0);
        assert_eq!(EarthModel::Wgs84Authalic.radius_km(), 6371.0088);
    }
}
