//! Geometric/temporal gating of link paths against ping arcs.
use hifitime::{Epoch, Unit};

use crate::arc::PingArc;
use crate::cfg::MatchCriteria;
use crate::geo::{Coordinate, GeodesicCurve, PathVariant};

/// Closest approach [km] of a sampled curve to an arc's circle: the
/// minimum, over the samples, of |distance-to-center − radius|, using
/// the arc's own reference Earth radius.
pub fn closest_approach_km(curve: &GeodesicCurve, arc: &PingArc) -> f64 {
    curve
        .points
        .iter()
        .map(|p| (p.haversine_km(&arc.center, arc.earth_radius_km) - arc.radius_km).abs())
        .fold(f64::INFINITY, f64::min)
}

/// A satisfied arc match for one link.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ArcMatch {
    /// Index of the matched arc in model order
    pub arc_index: usize,
    /// Closest approach achieved [km]
    pub deviation_km: f64,
    /// Variant that achieved it
    pub path: PathVariant,
}

/// Tests a link against the arc list. A match requires a known arc
/// time, a report time within the window, and a short- or long-path
/// closest approach within tolerance. Policy is first match wins in
/// arc list order, not best match.
pub fn match_link(
    time: Epoch,
    source: Coordinate,
    destination: Coordinate,
    arcs: &[PingArc],
    criteria: &MatchCriteria,
) -> Option<ArcMatch> {
    let short = GeodesicCurve::between(source, destination, criteria.curve_samples, PathVariant::Short);
    let long = GeodesicCurve::between(source, destination, criteria.curve_samples, PathVariant::Long);
    let window = criteria.time_window_minutes * Unit::Minute;

    for (arc_index, arc) in arcs.iter().enumerate() {
        let arc_time = match arc.time {
            Some(t) => t,
            None => continue,
        };
        if (time - arc_time).abs() > window {
            continue;
        }

        let deviation_short = closest_approach_km(&short, arc);
        let deviation_long = closest_approach_km(&long, arc);
        let (deviation_km, path) = if deviation_long < deviation_short {
            (deviation_long, PathVariant::Long)
        } else {
            (deviation_short, PathVariant::Short)
        };

        if deviation_km <= criteria.distance_tolerance_km {
            return Some(ArcMatch {
                arc_index,
                deviation_km,
                path,
            });
        }
    }

    None
}

#[cfg(test)]
mod test {
    use super::{closest_approach_km, match_link};
    use crate::arc::PingArc;
    use crate::cfg::MatchCriteria;
    use crate::geo::{Coordinate, GeodesicCurve, PathVariant};
    use hifitime::{Epoch, Unit};

    fn arc(id: &str, time: Option<Epoch>, center: Coordinate, radius_km: f64) -> PingArc {
        PingArc {
            id: id.to_string(),
            time,
            center,
            radius_km,
            earth_radius_km: 6371.0,
        }
    }

    #[test]
    fn closest_approach_on_circle_is_zero() {
        // equatorial path passing right through the circle
        let center = Coordinate::new(0.0, 100.0);
        let radius = 6371.0 * 10.0_f64.to_radians();
        let curve = GeodesicCurve::between(
            Coordinate::new(0.0, 80.0),
            Coordinate::new(0.0, 120.0),
            512,
            PathVariant::Short,
        );
        let a = arc("a", None, center, radius);
        // sampling density bounds how close a sample can land on the circle
        assert!(closest_approach_km(&curve, &a) < 5.0);
    }

    #[test]
    fn time_window_gate() {
        let t0 = Epoch::from_gregorian_utc(2014, 3, 7, 20, 0, 0, 0);
        let center = Coordinate::new(0.0, 100.0);
        // path crossing the circle, generous distance tolerance
        let arcs = vec![arc("a", Some(t0), center, 300.0)];
        let criteria = MatchCriteria {
            time_window_minutes: 20.0,
            distance_tolerance_km: 250.0,
            curve_samples: 256,
        };
        let src = Coordinate::new(0.0, 95.0);
        let dst = Coordinate::new(0.0, 105.0);

        let near = t0 + 5.0 * Unit::Minute;
        assert!(match_link(near, src, dst, &arcs, &criteria).is_some());

        let far = t0 + 30.0 * Unit::Minute;
        assert!(match_link(far, src, dst, &arcs, &criteria).is_none());
    }

    #[test]
    fn unknown_arc_time_never_matches() {
        let center = Coordinate::new(0.0, 100.0);
        let arcs = vec![arc("a", None, center, 300.0)];
        let criteria = MatchCriteria::default();
        let t = Epoch::from_gregorian_utc(2014, 3, 7, 20, 0, 0, 0);
        let matched = match_link(
            t,
            Coordinate::new(0.0, 95.0),
            Coordinate::new(0.0, 105.0),
            &arcs,
            &criteria,
        );
        assert!(matched.is_none());
    }

    #[test]
    fn first_match_wins() {
        let t0 = Epoch::from_gregorian_utc(2014, 3, 7, 20, 0, 0, 0);
        let center = Coordinate::new(0.0, 100.0);
        // both arcs eligible; the second is geometrically tighter but
        // the first in model order is the one reported
        let arcs = vec![
            arc("wider", Some(t0), center, 400.0),
            arc("tighter", Some(t0), center, 200.0),
        ];
        let criteria = MatchCriteria {
            time_window_minutes: 20.0,
            distance_tolerance_km: 500.0,
            curve_samples: 256,
        };
        let matched = match_link(
            t0,
            Coordinate::new(0.0, 95.0),
            Coordinate::new(0.0, 105.0),
            &arcs,
            &criteria,
        )
        .unwrap();
        assert_eq!(matched.arc_index, 0);
    }

    #[test]
    fn distance_tolerance_gate() {
        let t0 = Epoch::from_gregorian_utc(2014, 3, 7, 20, 0, 0, 0);
        // circle nowhere near the path
        let arcs = vec![arc("a", Some(t0), Coordinate::new(60.0, -40.0), 100.0)];
        let criteria = MatchCriteria::default();
        let matched = match_link(
            t0,
            Coordinate::new(0.0, 95.0),
            Coordinate::new(0.0, 105.0),
            &arcs,
            &criteria,
        );
        assert!(matched.is_none());
    }
}
