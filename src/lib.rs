#![doc = include_str!("../README.md")]

// private modules
mod arc;
mod baseline;
mod candidate;
mod cfg;
mod correlator;
mod error;
mod geo;
pub mod grid;
mod link;
mod matcher;

pub mod constants;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::arc::{ArcModel, PingArc, RawArc};
    pub use crate::baseline::{
        AnomalyReason, AnomalyVerdict, Baseline, BaselineRow, BaselineScope, BaselineTable,
        GroupKey, LinkScores, RobustStat,
    };
    pub use crate::candidate::Candidate;
    pub use crate::cfg::{
        AnomalyCriteria, ArcCalibration, Config, EarthModel, MatchCriteria, RarePolicy,
    };
    pub use crate::correlator::{window_floor_2min, Correlation, Correlator};
    pub use crate::geo::{Coordinate, GeodesicCurve, PathVariant};
    pub use crate::grid;
    pub use crate::link::{Endpoint, LinkMeasurement};
    pub use crate::matcher::{closest_approach_km, match_link, ArcMatch};
    // re-export
    pub use hifitime::{Duration, Epoch, Unit};
}

// pub export
pub use error::Error;
