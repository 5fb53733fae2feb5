//! Robust per-group baselines and anomaly scoring.
//!
//! Two scopes are built over the full link set: a fine scope keyed by
//! (source, destination, band) and a per-band fallback used when a
//! group is too thin to trust. All estimators are median based so a
//! handful of outliers cannot drag the baseline towards themselves.
use std::collections::HashMap;

use itertools::Itertools;
use log::info;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cfg::AnomalyCriteria;
use crate::constants::MAD_NORMAL_SCALE;
use crate::error::Error;
use crate::link::LinkMeasurement;

/// Fine baseline scope key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    /// Transmitting station
    pub source: String,
    /// Receiving station
    pub destination: String,
    /// Band designator
    pub band: String,
}

impl GroupKey {
    pub fn of(link: &LinkMeasurement) -> Self {
        Self {
            source: link.source.id.clone(),
            destination: link.destination.id.clone(),
            band: link.band.clone(),
        }
    }
}

/// Which scope a baseline was selected from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BaselineScope {
    /// (source, destination, band)
    Group,
    /// band only
    Band,
}

impl std::fmt::Display for BaselineScope {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Group => write!(fmt, "group"),
            Self::Band => write!(fmt, "band"),
        }
    }
}

/// Location/scale estimate for one measure. Both are absent when the
/// group held no parseable samples; a zero MAD is kept as-is and
/// handled at scoring time.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RobustStat {
    pub median: Option<f64>,
    pub mad: Option<f64>,
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some(0.5 * (sorted[mid - 1] + sorted[mid]))
    }
}

impl RobustStat {
    fn from_samples(values: &[f64]) -> Self {
        let med = median(values);
        let mad = med.map(|m| {
            let deviations: Vec<f64> = values.iter().map(|v| (v - m).abs()).collect();
            median(&deviations)
        });
        Self {
            median: med,
            mad: mad.flatten(),
        }
    }

    /// Robust z-score of `value` against this estimate:
    /// (value − median) / (1.4826 × MAD). Undefined (`None`, never a
    /// division by zero) when the value, the median or the MAD is
    /// absent, or the MAD is zero. An undefined score is distinct
    /// from a zero score: zero is a valid non-anomalous reading.
    pub fn robust_z(&self, value: Option<f64>) -> Option<f64> {
        let value = value?;
        let med = self.median?;
        let mad = self.mad?;
        if mad == 0.0 {
            return None;
        }
        Some((value - med) / (MAD_NORMAL_SCALE * mad))
    }
}

/// Median/MAD baseline for one scope entry over {snr, frequency,
/// drift}. `count` is the largest per-measure sample count, so links
/// missing one measure still contribute to the others.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Baseline {
    pub count: usize,
    pub snr: RobustStat,
    pub frequency: RobustStat,
    pub drift: RobustStat,
}

#[derive(Default)]
struct SampleSet {
    snr: Vec<f64>,
    frequency: Vec<f64>,
    drift: Vec<f64>,
}

impl SampleSet {
    fn push(&mut self, link: &LinkMeasurement) {
        if let Some(snr) = link.snr {
            self.snr.push(snr);
        }
        if let Some(frequency) = link.frequency {
            self.frequency.push(frequency);
        }
        if let Some(drift) = link.drift {
            self.drift.push(drift);
        }
    }

    fn baseline(&self) -> Baseline {
        Baseline {
            count: self.snr.len().max(self.frequency.len()).max(self.drift.len()),
            snr: RobustStat::from_samples(&self.snr),
            frequency: RobustStat::from_samples(&self.frequency),
            drift: RobustStat::from_samples(&self.drift),
        }
    }
}

/// Per-measure robust z-scores of one link against its selected
/// baseline. Absent entries are undefined, not zero.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkScores {
    pub snr_z: Option<f64>,
    pub frequency_z: Option<f64>,
    pub drift_z: Option<f64>,
}

impl LinkScores {
    /// Largest |z| among the defined scores.
    pub fn max_abs(&self) -> Option<f64> {
        [self.snr_z, self.frequency_z, self.drift_z]
            .iter()
            .flatten()
            .map(|z| z.abs())
            .fold(None, |acc, z| Some(acc.map_or(z, |a: f64| a.max(z))))
    }
}

/// Why a link was retained by the anomaly pass.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AnomalyReason {
    Snr,
    Frequency,
    Drift,
    /// (source, destination, band) group at or below the rare count
    RareGroup,
    /// source endpoint at or below the rare count
    RareSource,
}

impl std::fmt::Display for AnomalyReason {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Snr => write!(fmt, "snr"),
            Self::Frequency => write!(fmt, "frequency"),
            Self::Drift => write!(fmt, "drift"),
            Self::RareGroup => write!(fmt, "rare_group"),
            Self::RareSource => write!(fmt, "rare_source"),
        }
    }
}

/// Outcome of scoring one link.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AnomalyVerdict {
    /// Scope the baseline came from, absent when no baseline applied
    pub scope: Option<BaselineScope>,
    /// Per-measure z-scores
    pub scores: LinkScores,
    /// Max |z| when it met the threshold
    pub score: Option<f64>,
    /// Gates that fired; empty means not retained
    pub reasons: Vec<AnomalyReason>,
}

impl AnomalyVerdict {
    pub fn is_flagged(&self) -> bool {
        !self.reasons.is_empty()
    }
}

/// One exportable baseline row (fine scope).
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineRow {
    pub key: GroupKey,
    pub baseline: Baseline,
}

/// Precomputed, read-only baselines over a full link set, shared by
/// all per-link evaluations.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineTable {
    groups: HashMap<GroupKey, Baseline>,
    bands: HashMap<String, Baseline>,
    group_counts: HashMap<GroupKey, usize>,
    source_counts: HashMap<String, usize>,
    min_group_count: usize,
}

impl BaselineTable {
    /// Builds both scopes in one pass over the link set. An empty set
    /// is fatal: there is nothing to baseline.
    pub fn build(links: &[LinkMeasurement], min_group_count: usize) -> Result<Self, Error> {
        if links.is_empty() {
            return Err(Error::EmptyLinkSet);
        }

        let mut group_samples: HashMap<GroupKey, SampleSet> = HashMap::new();
        let mut band_samples: HashMap<String, SampleSet> = HashMap::new();
        let mut group_counts: HashMap<GroupKey, usize> = HashMap::new();
        let mut source_counts: HashMap<String, usize> = HashMap::new();

        for link in links {
            let key = GroupKey::of(link);
            group_samples.entry(key.clone()).or_default().push(link);
            band_samples
                .entry(link.band.clone())
                .or_default()
                .push(link);
            *group_counts.entry(key).or_insert(0) += 1;
            *source_counts.entry(link.source.id.clone()).or_insert(0) += 1;
        }

        let groups: HashMap<GroupKey, Baseline> = group_samples
            .into_iter()
            .map(|(key, samples)| (key, samples.baseline()))
            .collect();
        let bands: HashMap<String, Baseline> = band_samples
            .into_iter()
            .map(|(band, samples)| (band, samples.baseline()))
            .collect();

        info!(
            "baselines: {} groups, {} bands over {} links",
            groups.len(),
            bands.len(),
            links.len()
        );

        Ok(Self {
            groups,
            bands,
            group_counts,
            source_counts,
            min_group_count,
        })
    }

    /// Selects the baseline for a key: the fine scope when its sample
    /// count meets the minimum, the band scope otherwise, nothing when
    /// neither exists.
    pub fn select(&self, key: &GroupKey) -> Option<(&Baseline, BaselineScope)> {
        if let Some(group) = self.groups.get(key) {
            if group.count >= self.min_group_count {
                return Some((group, BaselineScope::Group));
            }
        }
        self.bands
            .get(&key.band)
            .map(|band| (band, BaselineScope::Band))
    }

    /// Sample count of the fine scope group.
    pub fn group_count(&self, key: &GroupKey) -> usize {
        self.group_counts.get(key).copied().unwrap_or(0)
    }

    /// Sample count of a source endpoint across all its links.
    pub fn source_count(&self, source: &str) -> usize {
        self.source_counts.get(source).copied().unwrap_or(0)
    }

    /// Scores one link against its selected baseline.
    pub fn score(&self, link: &LinkMeasurement) -> (LinkScores, Option<BaselineScope>) {
        let key = GroupKey::of(link);
        match self.select(&key) {
            Some((baseline, scope)) => (
                LinkScores {
                    snr_z: baseline.snr.robust_z(link.snr),
                    frequency_z: baseline.frequency.robust_z(link.frequency),
                    drift_z: baseline.drift.robust_z(link.drift),
                },
                Some(scope),
            ),
            None => (LinkScores::default(), None),
        }
    }

    /// Full anomaly verdict for one link: statistical gates first,
    /// then the opt-in rare gates when no statistical gate fired.
    pub fn verdict(&self, link: &LinkMeasurement, criteria: &AnomalyCriteria) -> AnomalyVerdict {
        let key = GroupKey::of(link);
        let (scores, scope) = self.score(link);

        let mut reasons = Vec::new();
        for (z, reason) in [
            (scores.snr_z, AnomalyReason::Snr),
            (scores.frequency_z, AnomalyReason::Frequency),
            (scores.drift_z, AnomalyReason::Drift),
        ] {
            if let Some(z) = z {
                if z.abs() >= criteria.z_threshold {
                    reasons.push(reason);
                }
            }
        }

        if reasons.is_empty() {
            if let Some(rare) = &criteria.rare {
                if self.group_count(&key) <= rare.max_group_count {
                    reasons.push(AnomalyReason::RareGroup);
                }
                if self.source_count(&key.source) <= rare.max_source_count {
                    reasons.push(AnomalyReason::RareSource);
                }
            }
        }

        let score = scores.max_abs().filter(|s| *s >= criteria.z_threshold);

        AnomalyVerdict {
            scope,
            scores,
            score,
            reasons,
        }
    }

    /// Fine scope rows in (source, destination, band) order, for
    /// export by the persistence collaborator.
    pub fn rows(&self) -> Vec<BaselineRow> {
        self.groups
            .iter()
            .sorted_by(|(a, _), (b, _)| {
                (&a.source, &a.destination, &a.band).cmp(&(&b.source, &b.destination, &b.band))
            })
            .map(|(key, baseline)| BaselineRow {
                key: key.clone(),
                baseline: baseline.clone(),
            })
            .collect()
    }

    /// Band scope rows in band order.
    pub fn band_rows(&self) -> Vec<(String, Baseline)> {
        self.bands
            .iter()
            .sorted_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(band, baseline)| (band.clone(), baseline.clone()))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::{median, RobustStat};

    #[test]
    fn median_odd_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn robust_z_zero_mad_undefined() {
        let stat = RobustStat::from_samples(&[5.0, 5.0, 5.0, 5.0]);
        assert_eq!(stat.median, Some(5.0));
        assert_eq!(stat.mad, Some(0.0));
        assert_eq!(stat.robust_z(Some(100.0)), None);
    }

    #[test]
    fn robust_z_shift_invariant() {
        let samples = [1.0, 2.0, 3.0, 4.0, 10.0];
        let stat = RobustStat::from_samples(&samples);
        let z = stat.robust_z(Some(7.0)).unwrap();

        let shifted: Vec<f64> = samples.iter().map(|v| v + 42.5).collect();
        let stat = RobustStat::from_samples(&shifted);
        let z_shifted = stat.robust_z(Some(7.0 + 42.5)).unwrap();

        assert!((z - z_shifted).abs() < 1e-12);
    }

    #[test]
    fn robust_z_value() {
        // median 3, deviations [2,1,0,1,2] => MAD 1
        let stat = RobustStat::from_samples(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let z = stat.robust_z(Some(3.0 + 1.4826)).unwrap();
        assert!((z - 1.0).abs() < 1e-12);
        // exactly at the median: defined and zero, not absent
        assert_eq!(stat.robust_z(Some(3.0)), Some(0.0));
    }

    #[test]
    fn missing_value_undefined() {
        let stat = RobustStat::from_samples(&[1.0, 2.0, 3.0]);
        assert_eq!(stat.robust_z(None), None);
    }
}
