//! Common types and utilities shared across the firewx crates.

pub mod bbox;
pub mod error;
pub mod output;
pub mod region;
pub mod time;
pub mod units;

pub use bbox::BoundingBox;
pub use error::{FireWxError, FireWxResult};
pub use output::OutputLayout;
pub use region::{ReferenceSystem, RegionCatalog, RegionKey, RegionSettings};
pub use time::{ForecastPeriod, PeriodKind, TimeZoneSpec, ValidWindow};
pub use units::UnitConversion;
