//! Fire-weather plot products built on NDFD forecasts.
//!
//! Each [`Product`] turns one or two NDFD fields into a series of map frames,
//! one per forecast period, plus an animated GIF:
//!
//! - relative humidity: min/max RH, low RH, overnight recovery, trends
//! - temperature: max/min temperature, extreme heat, frost/freeze, trends
//! - critical fire weather: dry & windy, dry & gusty
//!
//! [`Plotter`] resolves the region, gathers data (supplied, local, or
//! downloaded) and writes the output tree.

pub mod config;
pub mod mask;
pub mod pairing;
pub mod plotter;
pub mod products;
pub mod request;

pub use config::{PlotterConfig, Thresholds};
pub use mask::{combined_mask, masked_field, threshold_mask, trend, Comparison, ThresholdMask};
pub use plotter::{Plotter, ProductOutput};
pub use products::{Product, ProductCategory, Rendering};
pub use request::ProductRequest;
