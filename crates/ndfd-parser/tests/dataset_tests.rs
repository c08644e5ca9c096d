//! End-to-end parsing of synthetic NDFD files.

use chrono::{TimeZone, Utc};
use firewx_common::BoundingBox;
use ndfd_parser::unpacking::decode_with_grib;
use ndfd_parser::{GridGeometry, NdfdDataset, NdfdError, StationTable};
use test_utils::grib2::BuilderGrid;
use test_utils::{
    assert_approx_eq, concat_messages, create_rh_grid, create_test_grid, require_test_file,
    NdfdMessageBuilder,
};

fn parse(bytes: &[u8]) -> NdfdDataset {
    NdfdDataset::from_bytes(bytes).expect("synthetic message should parse")
}

#[test]
fn test_hourly_rh_field() {
    let data = create_rh_grid(10, 8);
    let ds = parse(&NdfdMessageBuilder::rh().with_data(data.clone()).build());

    assert_eq!(ds.len(), 1);
    let grid = ds.field("RH")[0];
    assert_eq!(grid.shape(), (8, 10));
    assert_eq!(grid.units, "%");
    assert!(grid.window.is_instant());
    assert_eq!(grid.window.start, Utc.with_ymd_and_hms(2024, 7, 4, 12, 0, 0).unwrap());

    for (got, want) in grid.values.iter().zip(&data) {
        assert_approx_eq!(*got, *want, 0.01);
    }
}

#[test]
fn test_statistical_window_from_template_4_8() {
    let ds = parse(&NdfdMessageBuilder::max_rh().build());
    let grid = ds.field("MaxRH")[0];

    assert_eq!(grid.window.start, Utc.with_ymd_and_hms(2024, 7, 5, 0, 0, 0).unwrap());
    assert_eq!(grid.window.end, Utc.with_ymd_and_hms(2024, 7, 5, 12, 0, 0).unwrap());
    assert_eq!(grid.window.frame_file_name(), "2024_07_05_00.jpg");
}

#[test]
fn test_field_names_from_parameters() {
    let file = concat_messages(&[
        NdfdMessageBuilder::min_rh().build(),
        NdfdMessageBuilder::max_rh().build(),
        NdfdMessageBuilder::max_t().build(),
        NdfdMessageBuilder::min_t().build(),
        NdfdMessageBuilder::wind_speed().build(),
        NdfdMessageBuilder::wind_gust().build(),
    ]);
    let ds = parse(&file);
    assert_eq!(
        ds.field_names(),
        vec!["MaxRH", "MaxT", "MinRH", "MinT", "WindGust", "WindSpd"]
    );

    let max_t = ds.field("MaxT")[0];
    assert_eq!(max_t.units, "K");
    assert_approx_eq!(max_t.values[0], 300.0, 1e-3);
}

#[test]
fn test_multiple_periods_sorted_by_start() {
    let file = concat_messages(&[
        NdfdMessageBuilder::min_rh().with_forecast_hour(24).build(),
        NdfdMessageBuilder::min_rh().build(),
        NdfdMessageBuilder::min_rh().with_forecast_hour(48).build(),
    ]);
    let ds = parse(&file);
    let hours: Vec<i64> = ds
        .field("MinRH")
        .iter()
        .map(|g| (g.window.start - g.reference_time).num_hours())
        .collect();
    assert_eq!(hours, vec![0, 24, 48]);
}

#[test]
fn test_garbage_between_messages_is_skipped() {
    let mut file = b"HEADER".to_vec();
    file.extend(NdfdMessageBuilder::rh().build());
    file.extend_from_slice(&[0u8; 7]);
    file.extend(NdfdMessageBuilder::rh().with_forecast_hour(1).build());
    assert_eq!(parse(&file).len(), 2);
}

#[test]
fn test_unknown_field_fallback() {
    let ds = parse(&NdfdMessageBuilder::rh().with_parameter(1, 250).build());
    assert!(ds.field("MinRH").is_empty());
    assert_eq!(ds.field_or_unknown("MinRH").len(), 1);
    assert_eq!(ds.windows("MinRH").len(), 1);
}

#[test]
fn test_bitmap_points_become_nan() {
    let mut data = create_rh_grid(10, 8);
    data[0] = f32::NAN;
    data[42] = f32::NAN;
    let ds = parse(&NdfdMessageBuilder::rh().with_data(data.clone()).build());
    let grid = ds.field("RH")[0];

    assert!(grid.values[0].is_nan());
    assert!(grid.values[42].is_nan());
    assert_approx_eq!(grid.values[1], data[1], 0.01);
    assert_approx_eq!(grid.values[79], data[79], 0.01);
}

#[test]
fn test_decimal_scale_round_trip() {
    let data = create_rh_grid(10, 8);
    let ds = parse(
        &NdfdMessageBuilder::rh()
            .with_decimal_scale(1)
            .with_data(data.clone())
            .build(),
    );
    let grid = ds.field("RH")[0];
    assert_approx_eq!(grid.values[13], data[13], 0.01);
}

#[test]
fn test_scan_modes_normalize_to_south_first() {
    let data = create_test_grid(10, 8);
    for mode in [0x00u8, 0x40, 0x80, 0xC0, 0x60] {
        let ds = parse(
            &NdfdMessageBuilder::rh()
                .with_scanning_mode(mode)
                .with_data(data.clone())
                .build(),
        );
        let grid = ds.field("RH")[0];
        assert_eq!(grid.get(3, 2), Some(3002.0), "scanning mode {:#04x}", mode);

        let (lat, lon) = grid.lat_lon(0, 0);
        assert_approx_eq!(lat, 33.0, 1e-6);
        assert_approx_eq!(lon, -123.0, 1e-6);
    }
}

#[test]
fn test_lat_lon_geometry_lookup() {
    let ds = parse(&NdfdMessageBuilder::rh().with_data(create_test_grid(10, 8)).build());
    let grid = ds.field("RH")[0];

    // (i=4, j=3) sits at 36N, 119W
    assert_eq!(grid.value_at(36.2, -118.9), 4003.0);
    assert!(grid.value_at(60.0, -100.0).is_nan());

    let bounds = grid.geometry.bounds();
    assert_approx_eq!(bounds.west, -123.0, 1e-6);
    assert_approx_eq!(bounds.north, 40.0, 1e-6);
}

#[test]
fn test_lambert_geometry() {
    let ds = parse(&NdfdMessageBuilder::lambert(20, 10).with_constant_value(25.0).build());
    let grid = ds.field("RH")[0];

    assert!(matches!(grid.geometry, GridGeometry::Lambert(_)));
    let (lat, lon) = grid.lat_lon(0, 0);
    assert_approx_eq!(lat, 20.191999, 1e-3);
    assert_approx_eq!(lon, -121.554001, 1e-3);
    assert_eq!(grid.geometry.grid_index(lat, lon), Some((0, 0)));
}

#[test]
fn test_lambert_north_first_scan() {
    let data = create_test_grid(6, 5);
    let south_first = parse(&NdfdMessageBuilder::lambert(6, 5).with_data(data.clone()).build());
    let north_first = parse(
        &NdfdMessageBuilder::lambert(6, 5)
            .with_scanning_mode(0x00)
            .with_data(data)
            .build(),
    );
    let a = south_first.field("RH")[0];
    let b = north_first.field("RH")[0];
    assert_eq!(a.values, b.values);
}

#[test]
fn test_aligned_grids() {
    let file = concat_messages(&[
        NdfdMessageBuilder::min_rh().build(),
        NdfdMessageBuilder::wind_speed().build(),
        NdfdMessageBuilder::rh().with_grid(5, 5).build(),
    ]);
    let ds = parse(&file);
    let rh = ds.field("MinRH")[0];
    assert!(rh.is_aligned_with(ds.field("WindSpd")[0]));
    assert!(!rh.is_aligned_with(ds.field("RH")[0]));
}

#[test]
fn test_empty_buffer_is_an_error() {
    assert!(matches!(
        NdfdDataset::from_bytes(b"nothing here"),
        Err(NdfdError::InvalidFormat(_))
    ));
}

#[test]
fn test_truncated_file_is_an_error() {
    let message = NdfdMessageBuilder::rh().build();
    assert!(NdfdDataset::from_bytes(&message[..message.len() - 10]).is_err());
}

#[test]
fn test_station_sampling() {
    let ds = parse(&NdfdMessageBuilder::rh().with_data(create_test_grid(10, 8)).build());
    let grid = ds.field("RH")[0];

    let all = StationTable::sample(grid, &BoundingBox::new(-130.0, 30.0, -110.0, 45.0), 1);
    assert_eq!(all.len(), 80);

    let thinned = StationTable::sample(grid, &BoundingBox::new(-130.0, 30.0, -110.0, 45.0), 3);
    assert_eq!(thinned.len(), 4 * 3);
    assert!(thinned.iter().any(|s| s.value == 0.0));

    // Extent covers only columns 0-2 and rows 0-1
    let clipped = StationTable::sample(grid, &BoundingBox::new(-123.5, 32.5, -120.5, 34.5), 1);
    assert_eq!(clipped.len(), 6);
}

#[test]
fn test_station_sampling_skips_missing() {
    let mut data = vec![20.0; 80];
    data[0] = f32::NAN;
    let ds = parse(&NdfdMessageBuilder::rh().with_data(data).build());
    let stations = StationTable::sample(
        ds.field("RH")[0],
        &BoundingBox::new(-130.0, 30.0, -110.0, 45.0),
        1,
    );
    assert_eq!(stations.len(), 79);
}

#[test]
fn test_grib_crate_reads_builder_message() {
    let data = create_rh_grid(10, 8);
    let message = NdfdMessageBuilder::rh().with_data(data.clone()).build();
    let values = decode_with_grib(&message, 0).expect("grib crate should decode simple packing");
    assert_eq!(values.len(), 80);
    // Builder default scan order is south row first, so file order matches
    assert_approx_eq!(values[17], data[17], 0.01);
}

#[test]
fn test_grid_crossing_antimeridian() {
    let message = NdfdMessageBuilder::rh()
        .with_grid(4, 4)
        .with_grid_template(BuilderGrid::LatLon {
            south: 45.0,
            west: 170.0,
            dlat: 0.5,
            dlon: 5.0,
        })
        .build();
    let ds = parse(&message);
    let (_, lon) = ds.field("RH")[0].lat_lon(3, 0);
    // 170 + 15 wraps across the antimeridian
    assert_approx_eq!(lon, -175.0, 1e-6);
}

#[test]
fn test_real_ndfd_maxrh_file() {
    let path = require_test_file!("ds.maxrh.bin");
    let ds = NdfdDataset::from_file(&path).expect("failed to parse NDFD file");
    let grids = ds.field_or_unknown("MaxRH");
    assert!(!grids.is_empty());
    let (lo, hi) = grids[0].min_max().expect("grid has values");
    assert!(lo >= 0.0 && hi <= 100.5, "RH out of range: {}..{}", lo, hi);
}
