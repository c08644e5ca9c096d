//! Shared constants for tests.

/// Extents as (west, south, east, north).
pub mod bbox {
    /// Coverage of the default `NdfdMessageBuilder` grid.
    pub const SYNTHETIC: (f64, f64, f64, f64) = (-123.0, 33.0, -114.0, 40.0);
}

/// Default fire-weather thresholds.
pub mod thresholds {
    pub const LOW_MIN_RH_PCT: f32 = 15.0;
    pub const POOR_RECOVERY_PCT: f32 = 30.0;
    pub const EXCELLENT_RECOVERY_PCT: f32 = 80.0;
    pub const EXTREME_HEAT_F: f32 = 100.0;
    pub const FREEZE_F: f32 = 32.0;
    pub const CRITICAL_RH_PCT: f32 = 15.0;
    pub const WIND_MPH: f32 = 20.0;
    pub const GUST_MPH: f32 = 25.0;
}

/// Times used by the message builder.
pub mod time {
    /// Frame name of a window starting at the builder's reference time.
    pub const REFERENCE_FRAME: &str = "2024_07_04_12.jpg";
}
