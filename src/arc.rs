//! Ping arc reconstruction from raw ranging values and calibration.
use std::collections::HashMap;

use hifitime::Epoch;
use log::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cfg::ArcCalibration;
use crate::constants::R600_BIAS_US;
use crate::error::Error;
use crate::geo::Coordinate;

/// Raw ranging record, as parsed by the data collaborator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawArc {
    /// Arc identifier
    pub id: String,
    /// Originating channel tag, when known
    pub channel: Option<String>,
    /// Raw two-way timing value [µs]
    pub bto_us: f64,
    /// Explicit ground radius [km], wins over the derived one
    pub radius_km: Option<f64>,
    /// Explicit center, wins over the named-center table
    pub center_override: Option<Coordinate>,
}

impl RawArc {
    pub fn new(id: &str, bto_us: f64) -> Self {
        Self {
            id: id.to_string(),
            channel: None,
            bto_us,
            radius_km: None,
            center_override: None,
        }
    }

    pub fn with_channel(mut self, channel: &str) -> Self {
        self.channel = Some(channel.to_string());
        self
    }

    pub fn with_radius_km(mut self, radius_km: f64) -> Self {
        self.radius_km = Some(radius_km);
        self
    }

    pub fn with_center(mut self, center: Coordinate) -> Self {
        self.center_override = Some(center);
        self
    }

    fn is_alternate_channel(&self) -> bool {
        self.channel
            .as_deref()
            .map(|c| c.eq_ignore_ascii_case("R600"))
            .unwrap_or(false)
    }
}

/// Reconstructed satellite ping arc: a circle of constant ground
/// range from the satellite sub-point at a nominal instant.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PingArc {
    /// Arc identifier
    pub id: String,
    /// Nominal time (UTC). Arcs without one never pass the time
    /// window gate, so they can never match.
    pub time: Option<Epoch>,
    /// Satellite sub-point
    pub center: Coordinate,
    /// Ground radius [km]
    pub radius_km: f64,
    /// Earth radius [km] this arc uses for its own ranging
    pub earth_radius_km: f64,
}

/// Converts a two-way timing value to a one-way slant range [km].
fn slant_range_km(bto_us: f64, speed_of_light_km_s: f64) -> f64 {
    bto_us * 1e-6 * speed_of_light_km_s / 2.0
}

/// Inverts the spherical law of cosines to turn a slant range into a
/// ground range [km]. A slant range beyond the satellite-to-surface
/// maximum pushes the cosine argument outside [-1, 1]: it is clamped
/// so the inversion degrades instead of failing.
fn ground_range_km(slant_km: f64, sat_alt_km: f64, earth_radius_km: f64) -> f64 {
    let rs = earth_radius_km + sat_alt_km;
    let re = earth_radius_km;
    let cos_theta = (rs * rs + re * re - slant_km * slant_km) / (2.0 * rs * re);
    re * cos_theta.clamp(-1.0, 1.0).acos()
}

/// The reconstructed, read-only set of [PingArc]s shared by all
/// per-link evaluations.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcModel {
    arcs: Vec<PingArc>,
}

impl ArcModel {
    /// Reconstructs every usable arc. Raw records with neither an
    /// explicit center nor an entry in `centers` are dropped (logged,
    /// non-fatal): they are simply unusable for matching. An empty
    /// raw set, or one where nothing survives, aborts the batch.
    pub fn new(
        calibration: &ArcCalibration,
        raw: &[RawArc],
        centers: &HashMap<String, Coordinate>,
        times: &HashMap<String, Epoch>,
    ) -> Result<Self, Error> {
        if raw.is_empty() {
            return Err(Error::MissingArcRecords);
        }

        let earth_radius_km = calibration.earth_model.radius_km();
        let mut arcs = Vec::with_capacity(raw.len());

        for record in raw {
            let center = match record.center_override.or_else(|| centers.get(&record.id).copied())
            {
                Some(center) => center,
                None => {
                    debug!("{}: no resolvable center, dropped", record.id);
                    continue;
                },
            };

            let mut bto_us = record.bto_us + calibration.bto_bias_us;
            if record.is_alternate_channel() {
                bto_us -= R600_BIAS_US;
            }

            let slant_km =
                slant_range_km(bto_us, calibration.speed_of_light_km_s) * calibration.range_scale;

            let base_radius_km = record
                .radius_km
                .unwrap_or_else(|| ground_range_km(slant_km, calibration.sat_alt_km, earth_radius_km));

            let radius_km = (base_radius_km * calibration.ground_range_scale
                + calibration.ground_range_offset_km)
                .max(0.0);

            arcs.push(PingArc {
                id: record.id.clone(),
                time: times.get(&record.id).copied(),
                center,
                radius_km,
                earth_radius_km,
            });
        }

        if arcs.is_empty() {
            return Err(Error::NoUsableArcs);
        }

        info!("arc model: {}/{} records usable", arcs.len(), raw.len());
        Ok(Self { arcs })
    }

    /// Reconstructed arcs, in raw record order. Matching policy is
    /// first match wins in this order.
    pub fn arcs(&self) -> &[PingArc] {
        &self.arcs
    }
}
