//! Unit conversions for NDFD quantities.
//!
//! NDFD encodes temperatures in Kelvin and wind speeds in m/s; plots are
//! labeled in Fahrenheit and mph.

use serde::{Deserialize, Serialize};

const KELVIN_OFFSET: f64 = 273.15;
const MPH_PER_MS: f64 = 2.236_936_292_054_402;
const KNOTS_PER_MS: f64 = 1.943_844_492_440_604_7;

pub fn kelvin_to_fahrenheit(k: f64) -> f64 {
    (k - KELVIN_OFFSET) * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_kelvin(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0 + KELVIN_OFFSET
}

pub fn kelvin_to_celsius(k: f64) -> f64 {
    k - KELVIN_OFFSET
}

pub fn celsius_to_kelvin(c: f64) -> f64 {
    c + KELVIN_OFFSET
}

pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

pub fn ms_to_mph(ms: f64) -> f64 {
    ms * MPH_PER_MS
}

pub fn mph_to_ms(mph: f64) -> f64 {
    mph / MPH_PER_MS
}

pub fn ms_to_knots(ms: f64) -> f64 {
    ms * KNOTS_PER_MS
}

pub fn knots_to_ms(knots: f64) -> f64 {
    knots / KNOTS_PER_MS
}

/// Conversion applied elementwise to a grid before plotting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitConversion {
    #[default]
    None,
    KelvinToFahrenheit,
    KelvinToCelsius,
    MsToMph,
    MsToKnots,
}

impl UnitConversion {
    /// Convert a single value. NaN stays NaN.
    pub fn apply(&self, value: f32) -> f32 {
        let v = value as f64;
        let out = match self {
            UnitConversion::None => v,
            UnitConversion::KelvinToFahrenheit => kelvin_to_fahrenheit(v),
            UnitConversion::KelvinToCelsius => kelvin_to_celsius(v),
            UnitConversion::MsToMph => ms_to_mph(v),
            UnitConversion::MsToKnots => ms_to_knots(v),
        };
        out as f32
    }

    /// Undo the conversion for a single value.
    pub fn invert(&self, value: f32) -> f32 {
        let v = value as f64;
        let out = match self {
            UnitConversion::None => v,
            UnitConversion::KelvinToFahrenheit => fahrenheit_to_kelvin(v),
            UnitConversion::KelvinToCelsius => celsius_to_kelvin(v),
            UnitConversion::MsToMph => mph_to_ms(v),
            UnitConversion::MsToKnots => knots_to_ms(v),
        };
        out as f32
    }

    /// Convert a whole grid in place.
    pub fn apply_in_place(&self, values: &mut [f32]) {
        if *self == UnitConversion::None {
            return;
        }
        for v in values.iter_mut() {
            *v = self.apply(*v);
        }
    }

    /// Unit label after conversion, given the native unit.
    pub fn output_units<'a>(&self, native: &'a str) -> &'a str {
        match self {
            UnitConversion::None => native,
            UnitConversion::KelvinToFahrenheit => "°F",
            UnitConversion::KelvinToCelsius => "°C",
            UnitConversion::MsToMph => "MPH",
            UnitConversion::MsToKnots => "kts",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_points() {
        assert!((kelvin_to_fahrenheit(273.15) - 32.0).abs() < 1e-9);
        assert!((kelvin_to_fahrenheit(373.15) - 212.0).abs() < 1e-9);
        assert!((ms_to_mph(10.0) - 22.369_362_920_544).abs() < 1e-6);
        assert!((celsius_to_fahrenheit(-40.0) + 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_conversions_invert() {
        for k in [200.0, 255.5, 273.15, 310.9] {
            assert!((fahrenheit_to_kelvin(kelvin_to_fahrenheit(k)) - k).abs() < 1e-9);
        }
        for ms in [0.0, 3.3, 17.8, 60.0] {
            assert!((mph_to_ms(ms_to_mph(ms)) - ms).abs() < 1e-9);
            assert!((knots_to_ms(ms_to_knots(ms)) - ms).abs() < 1e-9);
        }
    }

    #[test]
    fn test_conversions_are_linear() {
        // f(a + b) - f(b) == f(a) - f(0)
        let f = kelvin_to_fahrenheit;
        let (a, b) = (12.5, 280.0);
        assert!(((f(a + b) - f(b)) - (f(a) - f(0.0))).abs() < 1e-9);
        assert!((ms_to_mph(4.0) - 2.0 * ms_to_mph(2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_grid_conversion_keeps_nan() {
        let mut grid = vec![273.15, f32::NAN, 300.0];
        UnitConversion::KelvinToFahrenheit.apply_in_place(&mut grid);
        assert!((grid[0] - 32.0).abs() < 1e-3);
        assert!(grid[1].is_nan());
        assert!((UnitConversion::KelvinToFahrenheit.invert(grid[2]) - 300.0).abs() < 1e-3);
    }
}
