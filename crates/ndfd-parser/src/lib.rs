//! NDFD GRIB2 parsing.
//!
//! Reads the National Digital Forecast Database `.bin` files (concatenated
//! GRIB2 messages, one forecast period per message) into [`ForecastGrid`]s.
//! Section parsing and simple packing are implemented here; complex-packed
//! messages are decoded through the `grib` crate.

pub mod dataset;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod message;
pub mod sections;
pub mod station;
pub mod tables;
pub mod unpacking;

pub use dataset::NdfdDataset;
pub use error::{NdfdError, NdfdResult};
pub use geometry::{GridGeometry, LatLonGrid};
pub use grid::ForecastGrid;
pub use sections::StatisticalProcess;
pub use station::{Station, StationTable};
