//! Synthetic forecast fields.
//!
//! Every generator returns row-major values with row 0 at the south edge,
//! the layout `ForecastGrid` uses after normalization.

/// Grid where each cell holds `col * 1000 + row`.
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1000.0);
/// assert_eq!(grid[10], 1.0);
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Relative humidity in percent, dry in the south-west and moist to the
/// north-east (5% to 95%).
pub fn create_rh_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    let span = (width + height).saturating_sub(2).max(1) as f32;
    for row in 0..height {
        for col in 0..width {
            data.push(5.0 + 90.0 * (col + row) as f32 / span);
        }
    }
    data
}

/// Temperature in Kelvin, 280K in the north to 315K in the south.
pub fn create_temperature_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    let span = height.saturating_sub(1).max(1) as f32;
    for row in 0..height {
        let temp = 315.0 - 35.0 * row as f32 / span;
        data.extend(std::iter::repeat(temp).take(width));
    }
    data
}

/// Wind speed in m/s: calm at the centre, 25 m/s at the corners.
pub fn create_wind_speed_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    let center_x = (width as f32 - 1.0) / 2.0;
    let center_y = (height as f32 - 1.0) / 2.0;
    let max_dist = (center_x * center_x + center_y * center_y).sqrt().max(1.0);

    for row in 0..height {
        for col in 0..width {
            let dx = col as f32 - center_x;
            let dy = row as f32 - center_y;
            data.push((dx * dx + dy * dy).sqrt() / max_dist * 25.0);
        }
    }
    data
}

/// Copy of a grid with NaN written at the given flat indices.
pub fn create_grid_with_nans(
    width: usize,
    height: usize,
    value: f32,
    nan_indices: &[usize],
) -> Vec<f32> {
    let mut data = vec![value; width * height];
    for &idx in nan_indices {
        if idx < data.len() {
            data[idx] = f32::NAN;
        }
    }
    data
}
