use hifitime::Epoch;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::grid;

/// One end of a reported link: a station identifier and its position,
/// already resolved from a grid locator or given directly.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Endpoint {
    /// Station identifier (callsign)
    pub id: String,
    /// Resolved position
    pub position: Coordinate,
}

impl Endpoint {
    pub fn new(id: &str, position: Coordinate) -> Self {
        Self {
            id: id.to_string(),
            position,
        }
    }

    /// Resolves the endpoint position from a Maidenhead locator.
    /// `None` for malformed locators: the caller skips the record.
    pub fn from_grid(id: &str, locator: &str) -> Option<Self> {
        let position = grid::decode(locator)?;
        Some(Self::new(id, position))
    }

    /// Resolves from the finest locator a record offers, preferring
    /// the 6-character field over the 4-character one.
    pub fn from_best_grid(id: &str, six: Option<&str>, four: Option<&str>) -> Option<Self> {
        Self::from_grid(id, grid::best_of(six, four)?)
    }
}

/// One recorded propagation report between two endpoints. Immutable
/// once built; measures that failed to parse upstream are absent
/// rather than zeroed so they never contaminate a baseline.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkMeasurement {
    /// Report time (UTC)
    pub time: Epoch,
    /// Band designator
    pub band: String,
    /// Transmitting endpoint
    pub source: Endpoint,
    /// Receiving endpoint
    pub destination: Endpoint,
    /// Signal to noise ratio [dB]
    pub snr: Option<f64>,
    /// Reported frequency [MHz]
    pub frequency: Option<f64>,
    /// Frequency drift [Hz/min]
    pub drift: Option<f64>,
    /// Reported great-circle distance [km], when the source provides one
    pub distance_km: Option<f64>,
    /// Source-provided anomaly flag (pre-computed upstream)
    pub flagged: bool,
}

impl LinkMeasurement {
    pub fn new(time: Epoch, band: &str, source: Endpoint, destination: Endpoint) -> Self {
        Self {
            time,
            band: band.to_string(),
            source,
            destination,
            snr: None,
            frequency: None,
            drift: None,
            distance_km: None,
            flagged: false,
        }
    }

    pub fn with_snr(mut self, snr: f64) -> Self {
        self.snr = Some(snr);
        self
    }

    pub fn with_frequency(mut self, frequency: f64) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn with_drift(mut self, drift: f64) -> Self {
        self.drift = Some(drift);
        self
    }

    pub fn with_distance_km(mut self, distance_km: f64) -> Self {
        self.distance_km = Some(distance_km);
        self
    }

    /// Marks this link as anomaly-flagged by the data source.
    pub fn with_flag(mut self) -> Self {
        self.flagged = true;
        self
    }

    /// True when this report sits on a canonical sampling instant:
    /// seconds zeroed, even minute.
    pub fn on_canonical_timestamp(&self) -> bool {
        let (_, _, _, _, minute, second, nanos) = self.time.to_gregorian_utc();
        second == 0 && nanos == 0 && minute % 2 == 0
    }
}

#[cfg(test)]
mod test {
    use super::{Endpoint, LinkMeasurement};
    use hifitime::Epoch;

    #[test]
    fn endpoint_from_grid() {
        let ep = Endpoint::from_grid("VK6XT", "OF86td").unwrap();
        assert!(ep.position.lat_deg < 0.0);
        assert!(ep.position.lon_deg > 100.0);
        assert!(Endpoint::from_grid("VK6XT", "??").is_none());
    }

    #[test]
    fn endpoint_prefers_finer_grid() {
        let fine = Endpoint::from_best_grid("VK6XT", Some("OF86td"), Some("OF86")).unwrap();
        let coarse = Endpoint::from_best_grid("VK6XT", None, Some("OF86")).unwrap();
        assert_ne!(fine.position, coarse.position);
        assert!(Endpoint::from_best_grid("VK6XT", None, None).is_none());
    }

    #[test]
    fn canonical_timestamps() {
        let src = Endpoint::from_grid("A", "JJ00").unwrap();
        let dst = Endpoint::from_grid("B", "JK11").unwrap();

        let on = Epoch::from_gregorian_utc(2014, 3, 7, 18, 24, 0, 0);
        let link = LinkMeasurement::new(on, "20m", src.clone(), dst.clone());
        assert!(link.on_canonical_timestamp());

        let odd_minute = Epoch::from_gregorian_utc(2014, 3, 7, 18, 25, 0, 0);
        let link = LinkMeasurement::new(odd_minute, "20m", src.clone(), dst.clone());
        assert!(!link.on_canonical_timestamp());

        let seconds = Epoch::from_gregorian_utc(2014, 3, 7, 18, 24, 30, 0);
        let link = LinkMeasurement::new(seconds, "20m", src, dst);
        assert!(!link.on_canonical_timestamp());
    }
}
