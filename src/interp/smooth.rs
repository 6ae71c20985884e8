//! Iterative 3-point smoother.
//!
//! Each pass replaces interior point `t` with
//! `0.25 * v[t-1] + 0.5 * v[t] + 0.25 * v[t+1]`, reading only the previous
//! pass's values. Endpoints are copied through unchanged.
//!
//! A point whose neighbour is exactly [`SMOOTHING_GUARD`] is also copied through
//! unchanged. Grid placeholders are 0.0, so this keeps unbracketed points from
//! bleeding into real values. It cannot tell a placeholder from a genuine zero
//! (e.g. a zero wind radius); that behaviour is kept as is.

use crate::domain::ModelData;

/// Neighbour value that suppresses smoothing of a point.
pub const SMOOTHING_GUARD: f32 = 0.0;

/// True if `v` is the smoothing guard value.
pub fn is_smoothing_guard(v: f32) -> bool {
    v == SMOOTHING_GUARD
}

/// One pass over `src`, written into `dst` (same length).
pub fn smooth_pass(src: &[f32], dst: &mut [f32]) {
    let n = src.len();
    if n == 0 {
        return;
    }
    dst[0] = src[0];
    dst[n - 1] = src[n - 1];
    for t in 1..n.saturating_sub(1) {
        let (prev, next) = (src[t - 1], src[t + 1]);
        dst[t] = if !is_smoothing_guard(prev) && !is_smoothing_guard(next) {
            prev * 0.25 + src[t] * 0.5 + next * 0.25
        } else {
            src[t]
        };
    }
}

/// Run `passes` ping-pong passes over one series.
pub fn smooth_series(values: &[f32], passes: usize) -> Vec<f32> {
    let mut cur = values.to_vec();
    let mut next = vec![0.0; values.len()];
    for _ in 0..passes {
        smooth_pass(&cur, &mut next);
        std::mem::swap(&mut cur, &mut next);
    }
    cur
}

/// Smooth every field of a grid independently.
pub fn smooth(grid: &ModelData, passes: usize) -> ModelData {
    let fields = std::array::from_fn(|f| smooth_series(&grid.fields[f], passes));
    ModelData::new(grid.forecast_hour.clone(), fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_passes_is_identity() {
        let v = [1.0, 5.0, 2.0, 8.0];
        assert_eq!(smooth_series(&v, 0), v.to_vec());
    }

    #[test]
    fn single_pass_weights() {
        let out = smooth_series(&[1.0, 5.0, 3.0], 1);
        assert_eq!(out, vec![1.0, 3.5, 3.0]);
    }

    #[test]
    fn endpoints_never_change() {
        let v = [4.0, 9.0, 1.0, 7.0, 2.0];
        let out = smooth_series(&v, 25);
        assert_eq!(out[0], 4.0);
        assert_eq!(out[4], 2.0);
    }

    #[test]
    fn passes_read_previous_output() {
        // Second pass must see the first pass's 3.5, not the original 5.0.
        let out = smooth_series(&[1.0, 5.0, 3.0, 3.0], 2);
        let first = [1.0, 3.5, 3.5, 3.0];
        let expected = first[0] * 0.25 + first[1] * 0.5 + first[2] * 0.25;
        assert_eq!(out[1], expected);
    }

    #[test]
    fn zero_neighbour_freezes_point() {
        let out = smooth_series(&[0.0, 10.0, 20.0, 30.0], 1);
        assert_eq!(out[1], 10.0);
        assert_eq!(out[2], 20.0);

        let out = smooth_series(&[5.0, 10.0, 0.0], 1);
        assert_eq!(out[1], 10.0);
        assert!(is_smoothing_guard(-0.0));
    }

    #[test]
    fn short_series_are_untouched() {
        assert_eq!(smooth_series(&[], 3), Vec::<f32>::new());
        assert_eq!(smooth_series(&[2.0], 3), vec![2.0]);
        assert_eq!(smooth_series(&[2.0, 4.0], 3), vec![2.0, 4.0]);
    }

    #[test]
    fn nan_neighbour_spreads() {
        let out = smooth_series(&[f32::NAN, 1.0, 2.0], 1);
        assert!(out[1].is_nan());
    }
}
