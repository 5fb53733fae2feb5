//! Unit-sphere geometry: coordinates, great-circle interpolation,
//! haversine ranging.
use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Angle below which two endpoint vectors are treated as coincident
/// (or their cross product as a null axis).
const DEGENERATE_EPSILON: f64 = 1e-12;

/// Geographic position in degrees, latitude ∈ [-90, 90],
/// longitude ∈ [-180, 180].
#[derive(Debug, Default, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Coordinate {
    /// Latitude [°]
    pub lat_deg: f64,
    /// Longitude [°]
    pub lon_deg: f64,
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat_deg, lon_deg): (f64, f64)) -> Self {
        Self { lat_deg, lon_deg }
    }
}

impl Coordinate {
    pub fn new(lat_deg: f64, lon_deg: f64) -> Self {
        Self { lat_deg, lon_deg }
    }

    /// Maps to a point on the unit sphere. Internal computation form
    /// only: longitude is lost at the exact poles.
    pub(crate) fn to_unit_vector(self) -> Vector3<f64> {
        let lat = self.lat_deg.to_radians();
        let lon = self.lon_deg.to_radians();
        Vector3::new(
            lat.cos() * lon.cos(),
            lat.cos() * lon.sin(),
            lat.sin(),
        )
    }

    /// Maps a unit-sphere vector back to degrees.
    pub(crate) fn from_unit_vector(v: Vector3<f64>) -> Self {
        let lat = v.z.atan2((v.x * v.x + v.y * v.y).sqrt());
        let lon = v.y.atan2(v.x);
        Self {
            lat_deg: lat.to_degrees(),
            lon_deg: lon.to_degrees(),
        }
    }

    /// Great-circle distance to `rhs` in kilometers, on a sphere of
    /// `radius_km`. Symmetric in its operands.
    pub fn haversine_km(&self, rhs: &Self, radius_km: f64) -> f64 {
        let dlat = (rhs.lat_deg - self.lat_deg).to_radians();
        let dlon = (rhs.lon_deg - self.lon_deg).to_radians();
        let a = (dlat / 2.0).sin().powi(2)
            + self.lat_deg.to_radians().cos()
                * rhs.lat_deg.to_radians().cos()
                * (dlon / 2.0).sin().powi(2);
        2.0 * radius_km * a.sqrt().min(1.0).asin()
    }
}

/// Which of the two complementary geodesics through a pair of
/// endpoints a curve follows.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PathVariant {
    /// Direct geodesic, angle θ ≤ π
    Short,
    /// Complementary geodesic the long way around, angle 2π − θ
    Long,
}

impl std::fmt::Display for PathVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Short => write!(f, "short"),
            Self::Long => write!(f, "long"),
        }
    }
}

/// Rotates `v` by `angle` radians about `axis` (Rodrigues formula).
/// A null axis leaves `v` untouched.
fn rotate(v: Vector3<f64>, axis: Vector3<f64>, angle: f64) -> Vector3<f64> {
    let norm = axis.norm();
    if norm == 0.0 {
        return v;
    }
    let k = axis / norm;
    v * angle.cos() + k.cross(&v) * angle.sin() + k * k.dot(&v) * (1.0 - angle.cos())
}

/// Ordered point sequence sampled at uniform angular fraction along
/// one [PathVariant] of the great circle through two endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct GeodesicCurve {
    /// Geodesic variant this curve samples
    pub variant: PathVariant,
    /// Sampled positions, endpoints included
    pub points: Vec<Coordinate>,
}

impl GeodesicCurve {
    /// Samples `samples` points along the selected geodesic between
    /// `start` and `end`. Coincident or antipodal endpoints degenerate
    /// to just the two endpoints: no meaningful arc exists (the
    /// rotation axis is undefined for antipodes).
    pub fn between(
        start: Coordinate,
        end: Coordinate,
        samples: usize,
        variant: PathVariant,
    ) -> Self {
        let s = start.to_unit_vector();
        let e = end.to_unit_vector();

        // guards floating point values slightly outside [-1, 1]
        let dot = s.dot(&e).clamp(-1.0, 1.0);
        let mut theta = dot.acos();

        if theta < DEGENERATE_EPSILON {
            return Self {
                variant,
                points: vec![start, end],
            };
        }

        let mut axis = s.cross(&e);
        if axis.norm() < DEGENERATE_EPSILON {
            // antipodal: axis undefined
            return Self {
                variant,
                points: vec![start, end],
            };
        }

        if variant == PathVariant::Long {
            axis = -axis;
            theta = 2.0 * std::f64::consts::PI - theta;
        }

        let samples = samples.max(2);
        let points = (0..samples)
            .map(|i| {
                let frac = i as f64 / (samples - 1) as f64;
                Coordinate::from_unit_vector(rotate(s, axis, theta * frac))
            })
            .collect();

        Self { variant, points }
    }

    /// Central angle [rad] covered by this curve.
    pub fn angle_rad(&self) -> f64 {
        let first = match self.points.first() {
            Some(p) => p.to_unit_vector(),
            None => return 0.0,
        };
        let last = match self.points.last() {
            Some(p) => p.to_unit_vector(),
            None => return 0.0,
        };
        let theta = first.dot(&last).clamp(-1.0, 1.0).acos();
        match self.variant {
            PathVariant::Short => theta,
            PathVariant::Long => 2.0 * std::f64::consts::PI - theta,
        }
    }
}
