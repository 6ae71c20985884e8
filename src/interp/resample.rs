//! Resampling onto a regular 3-hour grid, and decimation back to the output
//! cadence.
//!
//! Grid hours with no bracketing pair of samples keep [`GRID_PLACEHOLDER`].
//! That happens when the first sample hour is not a multiple of three: the grid
//! starts on the multiple just below it.

use crate::domain::{ModelData, N_FIELDS};

/// Spacing of the working grid.
pub const GRID_STEP_HOURS: i32 = 3;

/// Value of grid points that no pair of samples brackets.
pub const GRID_PLACEHOLDER: f32 = 0.0;

/// A bucket resampled to the working grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Resampled {
    /// First sample hour, clamped at 0. Decimation keeps hours at or after it.
    pub min_hour: i32,
    pub grid: ModelData,
}

/// True if `hours` is strictly ascending.
pub fn is_strictly_ascending(hours: &[i32]) -> bool {
    hours.windows(2).all(|w| w[0] < w[1])
}

/// Linearly interpolate a bucket onto the 3-hour grid.
///
/// Expects strictly ascending hours. Returns `None` when there is nothing to
/// grid: no samples, or every sample before hour 0.
pub fn resample(data: &ModelData) -> Option<Resampled> {
    let hours = &data.forecast_hour;
    let min_hour = (*hours.iter().min()?).max(0);
    let max_hour = *hours.iter().max()?;
    if max_hour < min_hour {
        return None;
    }

    let min3_hour = (min_hour / GRID_STEP_HOURS) * GRID_STEP_HOURS;
    let n3 = ((max_hour - min_hour) / GRID_STEP_HOURS + 1) as usize;

    let grid_hours: Vec<i32> = (0..n3)
        .map(|n| min3_hour + n as i32 * GRID_STEP_HOURS)
        .collect();

    let mut fields: [Vec<f32>; N_FIELDS] = Default::default();
    for values in fields.iter_mut() {
        *values = vec![GRID_PLACEHOLDER; n3];
    }

    for (n, &h) in grid_hours.iter().enumerate() {
        let Some(t) = bracket(hours, h) else {
            continue;
        };
        let frac = (h - hours[t]) as f32 / (hours[t + 1] - hours[t]) as f32;
        for (out, src) in fields.iter_mut().zip(data.fields.iter()) {
            out[n] = src[t] + frac * (src[t + 1] - src[t]);
        }
    }

    Some(Resampled {
        min_hour,
        grid: ModelData::new(grid_hours, fields),
    })
}

/// Index `t` of the first pair with `hours[t] <= h <= hours[t + 1]`.
fn bracket(hours: &[i32], h: i32) -> Option<usize> {
    hours.windows(2).position(|w| w[0] <= h && h <= w[1])
}

/// Keep grid points at or after `min_hour` whose hour is a multiple of
/// `frequency`.
pub fn decimate(grid: &ModelData, min_hour: i32, frequency: i32) -> ModelData {
    let pick: Vec<usize> = grid
        .forecast_hour
        .iter()
        .enumerate()
        .filter(|&(_, &h)| h >= min_hour && h % frequency == 0)
        .map(|(n, _)| n)
        .collect();

    let hours = pick.iter().map(|&n| grid.forecast_hour[n]).collect();
    let fields = std::array::from_fn(|f| pick.iter().map(|&n| grid.fields[f][n]).collect());
    ModelData::new(hours, fields)
}
