//! Coordinate transformations for NDFD grids and map panels.
//!
//! Implements the projections from scratch without external dependencies.

pub mod lambert;
pub mod map_view;

pub use lambert::LambertConformal;
pub use map_view::MapView;
