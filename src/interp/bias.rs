//! Bias offsets against the current storm values.
//!
//! The offset for a field is `truth - model` at the zero forecast hour. It is
//! applied in full up to `min_relax_fcst_hour`, decays linearly to nothing at
//! `max_relax_fcst_hour`, and is not applied after that. A NaN component
//! (no truth for that field) leaves the field alone.
//!
//! Buckets without a zero hour borrow the offsets of the first bucket of the
//! same model that had one.

use crate::config::ModelConfig;
use crate::domain::{ModelData, N_FIELDS};
use crate::error::InterpError;

/// Per-field offsets `truth - model` at hour 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiasOffsets(pub [f32; N_FIELDS]);

/// Index of the first grid point at exactly hour 0.
pub fn zero_hour_index(hours: &[i32]) -> Option<usize> {
    hours.iter().position(|&h| h == 0)
}

/// Offsets at the zero hour, if the grid has one.
pub fn compute_offsets(grid: &ModelData, truth: &[f32; N_FIELDS]) -> Option<BiasOffsets> {
    let idx = zero_hour_index(&grid.forecast_hour)?;
    Some(BiasOffsets(std::array::from_fn(|f| {
        truth[f] - grid.fields[f][idx]
    })))
}

/// Pick the offsets for this bucket and the fallback to carry forward.
///
/// The fallback is the first offsets ever found for the model; later buckets
/// with their own zero hour use their own offsets but do not replace it.
pub fn resolve_offsets(
    model: &str,
    found: Option<BiasOffsets>,
    fallback: Option<BiasOffsets>,
) -> Result<(BiasOffsets, Option<BiasOffsets>), InterpError> {
    match (found, fallback) {
        (Some(offsets), None) => Ok((offsets, Some(offsets))),
        (Some(offsets), kept) => Ok((offsets, kept)),
        (None, Some(kept)) => Ok((kept, Some(kept))),
        (None, None) => Err(InterpError::Configuration {
            model: model.to_string(),
        }),
    }
}

/// Fraction of the offset applied at `hour`.
pub fn relax_scale(hour: i32, min_relax: i32, max_relax: i32) -> f32 {
    if hour <= min_relax {
        1.0
    } else if hour < max_relax {
        1.0 - (hour - min_relax) as f32 / (max_relax - min_relax) as f32
    } else {
        0.0
    }
}

/// Add relaxed offsets to every grid point.
pub fn apply_offsets(grid: &ModelData, offsets: &BiasOffsets, model: &ModelConfig) -> ModelData {
    let mut out = grid.clone();
    for (n, &hour) in grid.forecast_hour.iter().enumerate() {
        let scale = relax_scale(hour, model.min_relax_fcst_hour, model.max_relax_fcst_hour);
        if scale == 0.0 {
            continue;
        }
        for (values, &offset) in out.fields.iter_mut().zip(offsets.0.iter()) {
            if offset.is_nan() {
                continue;
            }
            values[n] += if scale == 1.0 { offset } else { offset * scale };
        }
    }
    out
}

/// Overwrite the zero-hour value of every field that has a truth value.
pub fn force_truth(grid: &ModelData, truth: &[f32; N_FIELDS]) -> ModelData {
    let mut out = grid.clone();
    if let Some(idx) = zero_hour_index(&grid.forecast_hour) {
        for (values, &t) in out.fields.iter_mut().zip(truth.iter()) {
            if !t.is_nan() {
                values[idx] = t;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Field, NO_TRUTH};
    use crate::interp::resample::tests::uniform;

    fn model(min: i32, max: i32) -> ModelConfig {
        ModelConfig {
            input_name: "GFSI".to_string(),
            output_name: "GFSO".to_string(),
            min_relax_fcst_hour: min,
            max_relax_fcst_hour: max,
        }
    }

    #[test]
    fn relax_scale_window() {
        assert_eq!(relax_scale(0, 12, 72), 1.0);
        assert_eq!(relax_scale(12, 12, 72), 1.0);
        assert!((relax_scale(42, 12, 72) - 0.5).abs() < 1e-6);
        assert_eq!(relax_scale(72, 12, 72), 0.0);
        assert_eq!(relax_scale(96, 12, 72), 0.0);
        // Degenerate window: step from full to nothing.
        assert_eq!(relax_scale(24, 24, 24), 1.0);
        assert_eq!(relax_scale(27, 24, 24), 0.0);
    }

    #[test]
    fn inverted_window_steps_at_min() {
        assert_eq!(relax_scale(0, 72, 12), 1.0);
        assert_eq!(relax_scale(48, 72, 12), 1.0);
        assert_eq!(relax_scale(72, 72, 12), 1.0);
        assert_eq!(relax_scale(75, 72, 12), 0.0);
        assert_eq!(relax_scale(120, 72, 12), 0.0);
    }

    #[test]
    fn offsets_come_from_zero_hour() {
        let grid = uniform(&[-3, 0, 3], &[1.0, 2.0, 3.0]);
        let mut truth = NO_TRUTH;
        truth[Field::Lat.index()] = 2.5;

        let offsets = compute_offsets(&grid, &truth).unwrap();
        assert_eq!(offsets.0[0], 0.5);
        assert!(offsets.0[1..].iter().all(|v| v.is_nan()));

        let no_zero = uniform(&[3, 6], &[1.0, 2.0]);
        assert!(compute_offsets(&no_zero, &truth).is_none());
    }

    #[test]
    fn first_found_offsets_become_fallback() {
        let a = BiasOffsets([1.0; N_FIELDS]);
        let b = BiasOffsets([2.0; N_FIELDS]);

        let (used, fallback) = resolve_offsets("M", Some(a), None).unwrap();
        assert_eq!((used, fallback), (a, Some(a)));

        let (used, fallback) = resolve_offsets("M", Some(b), fallback).unwrap();
        assert_eq!((used, fallback), (b, Some(a)));

        let (used, fallback) = resolve_offsets("M", None, fallback).unwrap();
        assert_eq!((used, fallback), (a, Some(a)));

        let err = resolve_offsets("M", None, None).unwrap_err();
        assert_eq!(err, InterpError::Configuration { model: "M".to_string() });
    }

    #[test]
    fn offsets_relax_over_window() {
        let grid = uniform(&[0, 12, 42, 72, 96], &[10.0, 10.0, 10.0, 10.0, 10.0]);
        let mut offsets = [f32::NAN; N_FIELDS];
        offsets[Field::Lat.index()] = 2.0;

        let out = apply_offsets(&grid, &BiasOffsets(offsets), &model(12, 72));
        assert_eq!(out.field(Field::Lat), &[12.0, 12.0, 11.0, 10.0, 10.0]);
        assert_eq!(out.field(Field::Lon), grid.field(Field::Lon));
    }

    #[test]
    fn truth_overwrites_zero_hour_only() {
        let grid = uniform(&[0, 6], &[1.0, 2.0]);
        let mut truth = NO_TRUTH;
        truth[Field::WindMax.index()] = 45.0;

        let out = force_truth(&grid, &truth);
        assert_eq!(out.field(Field::WindMax), &[45.0, 2.0]);
        assert_eq!(out.field(Field::Lat), &[1.0, 2.0]);
    }
}
