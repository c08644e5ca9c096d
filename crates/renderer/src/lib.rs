//! Map rendering for fire-weather plots.
//!
//! A [`Figure`] is built up in layers: filled fields or masks sampled from
//! gridded data, threshold outlines, boundary overlays, station value labels,
//! then title text and a colorbar. [`encode`] writes the frames and collates
//! them into an animation.

pub mod boundaries;
pub mod colorbar;
pub mod colormap;
pub mod contour;
pub mod encode;
pub mod error;
pub mod figure;
pub mod fill;
pub mod raster;
pub mod text;

pub use boundaries::{BoundarySet, BoundaryStyle};
pub use colormap::{builtin, ColorStop, Colormap, Extend, StyleConfig};
pub use error::{RenderError, RenderResult};
pub use figure::{Figure, StationLabel};
pub use raster::{BoolRaster, GridSource, Raster};
pub use text::FontSet;
