//! Tests for colormap classification and style loading.

use renderer::colormap::{builtin, hex_to_rgba, ColorStop, Colormap, Extend, StyleConfig};

// ============================================================================
// Classification
// ============================================================================

fn rh_bins() -> Colormap {
    Colormap::new(
        "rh",
        "%",
        vec![0.0, 10.0, 20.0, 30.0],
        vec![[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]],
        Extend::Neither,
    )
    .unwrap()
}

#[test]
fn test_classify_interior_values() {
    let cmap = rh_bins();
    assert_eq!(cmap.classify(0.0), Some(0));
    assert_eq!(cmap.classify(9.99), Some(0));
    assert_eq!(cmap.classify(10.0), Some(1));
    assert_eq!(cmap.classify(25.0), Some(2));
}

#[test]
fn test_classify_top_edge_included() {
    assert_eq!(rh_bins().classify(30.0), Some(2));
}

#[test]
fn test_classify_out_of_range_without_extend() {
    let cmap = rh_bins();
    assert_eq!(cmap.classify(-0.1), None);
    assert_eq!(cmap.classify(30.1), None);
    assert_eq!(cmap.classify(f32::NAN), None);
}

#[test]
fn test_classify_with_extend_both() {
    let mut cmap = rh_bins();
    cmap.extend = Extend::Both;
    assert_eq!(cmap.classify(-50.0), Some(0));
    assert_eq!(cmap.classify(500.0), Some(2));
    assert_eq!(cmap.classify(f32::NAN), None);
}

#[test]
fn test_color_for() {
    let cmap = rh_bins();
    assert_eq!(cmap.color_for(15.0), Some([0, 255, 0, 255]));
    assert_eq!(cmap.color_for(99.0), None);
}

#[test]
fn test_new_rejects_bad_tables() {
    assert!(Colormap::new("x", "", vec![0.0], vec![], Extend::Neither).is_err());
    assert!(Colormap::new("x", "", vec![0.0, 0.0], vec![[0; 4]], Extend::Neither).is_err());
    assert!(Colormap::new("x", "", vec![0.0, 1.0, 2.0], vec![[0; 4]], Extend::Neither).is_err());
}

#[test]
fn test_from_stops_interpolates_midpoints() {
    let stops = vec![ColorStop::new(0.0, "#000000"), ColorStop::new(20.0, "#C8C8C8")];
    let cmap = Colormap::from_stops("ramp", "", vec![0.0, 10.0, 20.0], &stops, Extend::Neither).unwrap();
    // Midpoints 5 and 15 sit a quarter and three quarters along the ramp
    assert_eq!(cmap.colors[0], [50, 50, 50, 255]);
    assert_eq!(cmap.colors[1], [150, 150, 150, 255]);
}

// ============================================================================
// Built-ins
// ============================================================================

#[test]
fn test_builtin_relative_humidity_covers_full_range() {
    let cmap = builtin::relative_humidity();
    assert_eq!(cmap.min(), 0.0);
    assert_eq!(cmap.max(), 100.0);
    assert_eq!(cmap.num_bins(), 20);
    assert!(cmap.classify(0.0).is_some());
    assert!(cmap.classify(100.0).is_some());
}

#[test]
fn test_builtin_low_rh_stops_at_threshold() {
    let cmap = builtin::low_rh(15.0).unwrap();
    assert_eq!(cmap.max(), 15.0);
    assert!(cmap.classify(15.0).is_some());
    assert!(cmap.classify(16.0).is_none());
}

#[test]
fn test_builtin_excellent_recovery_starts_at_threshold() {
    let cmap = builtin::excellent_recovery(80.0).unwrap();
    assert_eq!(cmap.min(), 80.0);
    assert!(cmap.classify(79.0).is_none());
    assert!(cmap.classify(100.0).is_some());
}

#[test]
fn test_builtin_extreme_heat_extends_upward() {
    let cmap = builtin::extreme_heat(100.0).unwrap();
    assert!(cmap.classify(99.0).is_none());
    assert!(cmap.classify(130.0).is_some());
}

#[test]
fn test_builtin_frost_freeze_extends_downward() {
    let cmap = builtin::frost_freeze(32.0).unwrap();
    assert!(cmap.classify(33.0).is_none());
    assert!(cmap.classify(-40.0).is_some());
}

#[test]
fn test_builtin_threshold_ramps_cover_fractional_thresholds() {
    // Every value on the shaded side of the threshold gets a color
    let low = builtin::low_rh(15.5).unwrap();
    for v in [0.0, 7.3, 15.0, 15.5] {
        assert!(low.color_for(v).is_some(), "low_rh {}", v);
    }
    let poor = builtin::poor_recovery(31.0).unwrap();
    assert!(poor.color_for(31.0).is_some());
    let excellent = builtin::excellent_recovery(80.5).unwrap();
    for v in [80.5, 99.9, 100.0, 100.4] {
        assert!(excellent.color_for(v).is_some(), "excellent_recovery {}", v);
    }
    let heat = builtin::extreme_heat(100.5).unwrap();
    for v in [100.5, 110.0, 135.0] {
        assert!(heat.color_for(v).is_some(), "extreme_heat {}", v);
    }
    let frost = builtin::frost_freeze(32.5).unwrap();
    for v in [32.5, 0.0, -40.0] {
        assert!(frost.color_for(v).is_some(), "frost_freeze {}", v);
    }
}

#[test]
fn test_builtin_threshold_ramps_reject_non_finite() {
    assert!(builtin::low_rh(f32::NAN).is_err());
    assert!(builtin::poor_recovery(f32::INFINITY).is_err());
    assert!(builtin::excellent_recovery(f32::NAN).is_err());
    assert!(builtin::extreme_heat(f32::NAN).is_err());
    assert!(builtin::frost_freeze(f32::NEG_INFINITY).is_err());
}

#[test]
fn test_builtin_trends_are_centered() {
    for cmap in [builtin::rh_trend(), builtin::temperature_trend()] {
        assert_eq!(cmap.min(), -cmap.max());
        assert_eq!(cmap.extend, Extend::Both);
    }
}

#[test]
fn test_builtin_red_flag_single_class() {
    let cmap = builtin::red_flag();
    assert_eq!(cmap.num_bins(), 1);
    assert_eq!(cmap.classify(1.0), Some(0));
    assert_eq!(cmap.classify(0.0), None);
}

// ============================================================================
// Style files
// ============================================================================

#[test]
fn test_style_with_explicit_colors() {
    let json = r##"{
        "version": "1.0",
        "colormaps": {
            "gusts": {
                "name": "Wind Gust",
                "units": "mph",
                "levels": [0, 20, 40],
                "colors": ["#FFFFFF", "#FF000080"],
                "extend": "max",
                "ticks": [0, 40]
            }
        }
    }"##;
    let style = StyleConfig::from_json(json).unwrap();
    let cmap = style.colormap("gusts").unwrap();

    assert_eq!(cmap.units, "mph");
    assert_eq!(cmap.colors[1], [255, 0, 0, 128]);
    assert_eq!(cmap.extend, Extend::Max);
    assert_eq!(cmap.ticks, vec![0.0, 40.0]);
    assert_eq!(cmap.classify(70.0), Some(1));
}

#[test]
fn test_style_with_stops() {
    let json = r##"{
        "version": "1.0",
        "colormaps": {
            "minrh": {
                "name": "Minimum RH",
                "levels": [0, 50, 100],
                "stops": [
                    {"value": 0, "color": "#000000"},
                    {"value": 100, "color": "#FFFFFF"}
                ]
            }
        }
    }"##;
    let cmap = StyleConfig::from_json(json).unwrap().colormap("minrh").unwrap();
    assert_eq!(cmap.extend, Extend::Neither);
    assert_eq!(cmap.ticks, vec![0.0, 50.0, 100.0]);
    assert!(cmap.colors[0][0] < cmap.colors[1][0]);
}

#[test]
fn test_style_missing_colors_and_stops() {
    let json = r##"{
        "version": "1.0",
        "colormaps": { "bad": { "name": "Bad", "levels": [0, 1] } }
    }"##;
    let style = StyleConfig::from_json(json).unwrap();
    assert!(style.colormap("bad").is_err());
    assert!(style.colormap("absent").is_err());
}

#[test]
fn test_style_bad_color() {
    let json = r##"{
        "version": "1.0",
        "colormaps": { "bad": { "name": "Bad", "levels": [0, 1], "colors": ["#XYZXYZ"] } }
    }"##;
    assert!(StyleConfig::from_json(json).unwrap().colormap("bad").is_err());
}

#[test]
fn test_style_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("styles.json");
    std::fs::write(
        &path,
        r##"{"version":"1.0","colormaps":{"a":{"name":"A","levels":[0,1],"colors":["#010203"]}}}"##,
    )
    .unwrap();
    let cmap = StyleConfig::from_file(&path).unwrap().colormap("a").unwrap();
    assert_eq!(cmap.colors, vec![[1, 2, 3, 255]]);
}

#[test]
fn test_hex_parsing_variants() {
    assert_eq!(hex_to_rgba(" #0a0B0c "), Some([10, 11, 12, 255]));
    assert_eq!(hex_to_rgba("#12345"), None);
}
