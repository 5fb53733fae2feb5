use crate::prelude::*;

#[test]
fn config_from_json_defaults() {
    let cfg: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(cfg, Config::default());
}

#[test]
fn config_from_json_overrides() {
    let cfg: Config = serde_json::from_str(
        r#"{
            "calibration": {
                "earth_model": "Spherical",
                "bto_bias_us": -25.0,
                "ground_range_offset_km": 12.5
            },
            "matching": {
                "time_window_minutes": 10.0,
                "curve_samples": 96
            },
            "anomaly": {
                "z_threshold": 2.0,
                "rare": { "max_group_count": 2 }
            }
        }"#,
    )
    .unwrap();

    assert_eq!(cfg.calibration.earth_model, EarthModel::Spherical);
    assert_eq!(cfg.calibration.bto_bias_us, -25.0);
    assert_eq!(cfg.calibration.ground_range_offset_km, 12.5);
    // untouched fields keep their defaults
    assert_eq!(cfg.calibration.sat_alt_km, 35_786.0);
    assert_eq!(cfg.matching.time_window_minutes, 10.0);
    assert_eq!(cfg.matching.curve_samples, 96);
    assert_eq!(cfg.matching.distance_tolerance_km, 250.0);
    assert_eq!(cfg.anomaly.z_threshold, 2.0);
    let rare = cfg.anomaly.rare.unwrap();
    assert_eq!(rare.max_group_count, 2);
    assert_eq!(rare.max_source_count, 1);
}
