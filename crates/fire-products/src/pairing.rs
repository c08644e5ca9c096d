//! Matching grids from different fields by valid time.

use ndfd_parser::ForecastGrid;
use tracing::debug;

/// Pair grids of two fields whose windows start at the same instant.
///
/// Output follows the order of `primary`; grids with no partner are dropped.
pub fn pair_by_start<'a>(
    primary: &[&'a ForecastGrid],
    secondary: &[&'a ForecastGrid],
) -> Vec<(&'a ForecastGrid, &'a ForecastGrid)> {
    let pairs: Vec<_> = primary
        .iter()
        .filter_map(|a| {
            secondary
                .iter()
                .find(|b| b.window.start == a.window.start)
                .map(|b| (*a, *b))
        })
        .collect();

    if pairs.len() < primary.len() {
        debug!(
            primary = primary.len(),
            paired = pairs.len(),
            "Dropped grids with no matching valid time"
        );
    }
    pairs
}

/// Successive grids of one field, `(earlier, later)`, for day-to-day trends.
///
/// Where the short and extended range files overlap a start time appears
/// twice; the first grid for each start is kept.
pub fn consecutive<'a>(grids: &[&'a ForecastGrid]) -> Vec<(&'a ForecastGrid, &'a ForecastGrid)> {
    let mut distinct: Vec<&'a ForecastGrid> = Vec::with_capacity(grids.len());
    for &grid in grids {
        if distinct.iter().all(|d| d.window.start != grid.window.start) {
            distinct.push(grid);
        }
    }
    if distinct.len() < grids.len() {
        debug!(
            grids = grids.len(),
            distinct = distinct.len(),
            "Dropped grids repeating a valid time"
        );
    }
    distinct.sort_by_key(|g| g.window.start);

    distinct.windows(2).map(|w| (w[0], w[1])).collect()
}
