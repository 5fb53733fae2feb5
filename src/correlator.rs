//! Candidate aggregation: merges anomaly evidence and arc geometry
//! into the final shortlist and its affected time windows.
use std::collections::BTreeSet;

use hifitime::Epoch;
use log::info;
use rayon::prelude::*;

use crate::arc::ArcModel;
use crate::baseline::{BaselineTable, LinkScores};
use crate::candidate::Candidate;
use crate::cfg::Config;
use crate::error::Error;
use crate::link::LinkMeasurement;
use crate::matcher;

/// Floors an instant to its 2-minute bucket: seconds zeroed, minute
/// floored to even.
pub fn window_floor_2min(t: Epoch) -> Epoch {
    let (year, month, day, hour, minute, _, _) = t.to_gregorian_utc();
    Epoch::from_gregorian_utc(year, month, day, hour, minute - (minute % 2), 0, 0)
}

/// Output of a correlation run: the ordered shortlist and the set of
/// 2-minute buckets holding at least one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Correlation {
    /// Candidates ordered by (time, source, destination)
    pub candidates: Vec<Candidate>,
    /// Affected 2-minute windows, ordered
    pub windows: BTreeSet<Epoch>,
}

/// Orchestrates both pipelines over a read-only [ArcModel]. Per-link
/// evaluation is stateless, so the scan is partitioned across threads
/// and merged order-insensitively; output ordering comes from an
/// explicit post-sort, never from scan order.
pub struct Correlator {
    cfg: Config,
    arcs: ArcModel,
}

impl Correlator {
    pub fn new(cfg: Config, arcs: ArcModel) -> Self {
        Self { cfg, arcs }
    }

    pub fn arc_model(&self) -> &ArcModel {
        &self.arcs
    }

    /// Builds the baseline table this correlator's statistics-first
    /// pipeline would use, for export or inspection.
    pub fn baselines(&self, links: &[LinkMeasurement]) -> Result<BaselineTable, Error> {
        BaselineTable::build(links, self.cfg.anomaly.min_group_count)
    }

    /// Arc-first pipeline: every link already anomaly-flagged by the
    /// data source is tested for arc proximity.
    pub fn correlate_flagged(&self, links: &[LinkMeasurement]) -> Result<Correlation, Error> {
        if links.is_empty() {
            return Err(Error::EmptyLinkSet);
        }

        let candidates: Vec<Candidate> = links
            .par_iter()
            .filter(|link| link.flagged)
            .filter_map(|link| self.try_match(link, None))
            .collect();

        Ok(self.finalize(candidates))
    }

    /// Statistics-first pipeline: links on canonical 2-minute
    /// timestamps are scored against the robust baselines, and those
    /// whose verdict fired are tested for arc proximity.
    pub fn correlate_scored(&self, links: &[LinkMeasurement]) -> Result<Correlation, Error> {
        let baselines = self.baselines(links)?;

        let candidates: Vec<Candidate> = links
            .par_iter()
            .filter(|link| link.on_canonical_timestamp())
            .filter_map(|link| {
                let verdict = baselines.verdict(link, &self.cfg.anomaly);
                if !verdict.is_flagged() {
                    return None;
                }
                self.try_match(link, Some(verdict.scores))
            })
            .collect();

        Ok(self.finalize(candidates))
    }

    fn try_match(&self, link: &LinkMeasurement, scores: Option<LinkScores>) -> Option<Candidate> {
        let matched = matcher::match_link(
            link.time,
            link.source.position,
            link.destination.position,
            self.arcs.arcs(),
            &self.cfg.matching,
        )?;
        let arc = &self.arcs.arcs()[matched.arc_index];
        Some(Candidate {
            link: link.clone(),
            arc_id: arc.id.clone(),
            arc_time: arc.time?,
            arc_radius_km: arc.radius_km,
            deviation_km: matched.deviation_km,
            path: matched.path,
            scores,
        })
    }

    fn finalize(&self, mut candidates: Vec<Candidate>) -> Correlation {
        candidates.sort_by(|a, b| {
            (a.link.time, &a.link.source.id, &a.link.destination.id).cmp(&(
                b.link.time,
                &b.link.source.id,
                &b.link.destination.id,
            ))
        });

        let windows: BTreeSet<Epoch> = candidates
            .iter()
            .map(|c| window_floor_2min(c.link.time))
            .collect();

        info!(
            "correlation: {} candidates across {} windows",
            candidates.len(),
            windows.len()
        );

        Correlation {
            candidates,
            windows,
        }
    }
}
