//! Maidenhead grid locator decoding.
use crate::geo::Coordinate;

/// Decodes a Maidenhead locator into the center of the finest cell it
/// resolves. Case insensitive. Accepts 4 or 6 significant characters
/// (field + square, optionally + subsquare); anything malformed or
/// shorter yields `None` and callers skip the record.
pub fn decode(locator: &str) -> Option<Coordinate> {
    let g: Vec<char> = locator.trim().to_uppercase().chars().collect();
    if g.len() < 4 {
        return None;
    }
    if !g[0].is_ascii_uppercase() || !g[1].is_ascii_uppercase() {
        return None;
    }

    // field: 20° x 10°
    let mut lon = (g[0] as u32 - 'A' as u32) as f64 * 20.0 - 180.0;
    let mut lat = (g[1] as u32 - 'A' as u32) as f64 * 10.0 - 90.0;
    let mut size_lon = 20.0;
    let mut size_lat = 10.0;

    // square: 2° x 1°. Codes that stop resolving here decode to the
    // coarser field center.
    if g[2].is_ascii_digit() && g[3].is_ascii_digit() {
        lon += g[2].to_digit(10)? as f64 * 2.0;
        lat += g[3].to_digit(10)? as f64;
        size_lon = 2.0;
        size_lat = 1.0;
    } else {
        return Some(Coordinate::new(lat + size_lat / 2.0, lon + size_lon / 2.0));
    }

    // subsquare: 5' x 2.5'
    if g.len() >= 6 && g[4].is_ascii_uppercase() && g[5].is_ascii_uppercase() {
        lon += (g[4] as u32 - 'A' as u32) as f64 * (5.0 / 60.0);
        lat += (g[5] as u32 - 'A' as u32) as f64 * (2.5 / 60.0);
        size_lon = 5.0 / 60.0;
        size_lat = 2.5 / 60.0;
    }

    Some(Coordinate::new(lat + size_lat / 2.0, lon + size_lon / 2.0))
}

/// Picks the finest usable locator of the two typically offered by
/// link records (6 characters preferred over 4).
pub fn best_of<'a>(six: Option<&'a str>, four: Option<&'a str>) -> Option<&'a str> {
    match six {
        Some(s) if !s.trim().is_empty() => Some(s),
        _ => match four {
            Some(s) if !s.trim().is_empty() => Some(s),
            _ => None,
        },
    }
}

#[cfg(test)]
mod test {
    use super::{best_of, decode};
    use rstest::*;

    #[rstest]
    // JJ00 spans lon [0, 2], lat [0, 1]
    #[case("JJ00", 0.5, 1.0)]
    // FN31pr: Newington CT area
    #[case("FN31pr", 41.7708333, -72.7083333)]
    #[case("OF86td", -33.8541666, 117.625)]
    fn cell_centers(#[case] locator: &str, #[case] lat: f64, #[case] lon: f64) {
        let c = decode(locator).unwrap();
        assert!((c.lat_deg - lat).abs() < 1e-4, "lat {}", c.lat_deg);
        assert!((c.lon_deg - lon).abs() < 1e-4, "lon {}", c.lon_deg);
    }

    #[test]
    fn case_insensitive() {
        let upper = decode("FN31PR").unwrap();
        let lower = decode("fn31pr").unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn decoded_center_lies_within_cell() {
        for loc in ["AA00", "RR99", "JN58td", "IO91wm", "PK04"] {
            let c = decode(loc).unwrap();
            let g: Vec<char> = loc.to_uppercase().chars().collect();
            let lon0 = (g[0] as u32 - 'A' as u32) as f64 * 20.0 - 180.0
                + g[2].to_digit(10).unwrap() as f64 * 2.0;
            let lat0 = (g[1] as u32 - 'A' as u32) as f64 * 10.0 - 90.0
                + g[3].to_digit(10).unwrap() as f64;
            assert!(c.lon_deg > lon0 && c.lon_deg < lon0 + 2.0);
            assert!(c.lat_deg > lat0 && c.lat_deg < lat0 + 1.0);
        }
    }

    #[test]
    fn malformed_yields_none() {
        for loc in ["", "F", "FN3", "1234", "F131", "  "] {
            assert_eq!(decode(loc), None, "locator {:?}", loc);
        }
    }

    #[test]
    fn non_digit_square_falls_back_to_field_center() {
        // FN field spans lon [-80, -60], lat [40, 50]
        let c = decode("FNAB").unwrap();
        assert!((c.lon_deg - (-70.0)).abs() < 1e-9);
        assert!((c.lat_deg - 45.0).abs() < 1e-9);
    }

    #[test]
    fn best_of_prefers_six() {
        assert_eq!(best_of(Some("FN31pr"), Some("FN31")), Some("FN31pr"));
        assert_eq!(best_of(Some("  "), Some("FN31")), Some("FN31"));
        assert_eq!(best_of(None, None), None);
    }
}
