use hifitime::Epoch;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::baseline::LinkScores;
use crate::geo::PathVariant;
use crate::link::LinkMeasurement;

/// A link retained by the correlation: the measurement, the arc it
/// matched, how close it came, and (on the statistics-first pipeline)
/// the scores that let it through.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Candidate {
    /// The matched link
    pub link: LinkMeasurement,
    /// Identifier of the matched arc
    pub arc_id: String,
    /// Nominal time of the matched arc
    pub arc_time: Epoch,
    /// Ground radius of the matched arc [km]
    pub arc_radius_km: f64,
    /// Minimum deviation of the link path from the arc circle [km]
    pub deviation_km: f64,
    /// Which geodesic variant achieved the deviation
    pub path: PathVariant,
    /// Robust z-scores, present on the statistics-first pipeline
    pub scores: Option<LinkScores>,
}
