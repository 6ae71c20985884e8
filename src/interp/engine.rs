//! Per-model, per-bucket interpolation.
//!
//! For each bucket of a model (ascending threshold order):
//!
//! resample -> smooth -> rebase -> bias offsets -> relax -> truth at hour 0 -> decimate
//!
//! Models are independent and run in parallel. Buckets of one model run in
//! order because a bucket without a zero hour borrows the offsets of an earlier
//! one.

use chrono::Duration;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::{Configuration, ModelConfig};
use crate::domain::{
    BucketMap, InterpolationInput, InterpolatorOutput, ModelData, ModelMap, N_FIELDS,
    WindRadiiBucket, within_horizon,
};
use crate::error::InterpError;
use crate::interp::bias::{
    BiasOffsets, apply_offsets, compute_offsets, force_truth, resolve_offsets,
};
use crate::interp::resample::{decimate, is_strictly_ascending, resample};
use crate::interp::smooth::smooth;

/// Everything a model's buckets share.
struct ModelContext<'a> {
    name: &'a str,
    model: &'a ModelConfig,
    truth: [f32; N_FIELDS],
    fcst_hour_offset: i32,
}

/// Runs the interpolation algorithm under a fixed configuration.
#[derive(Debug, Clone, Copy)]
pub struct Interpolator<'a> {
    config: &'a Configuration,
}

impl<'a> Interpolator<'a> {
    pub fn new(config: &'a Configuration) -> Self {
        Self { config }
    }

    /// Interpolate every requested model.
    ///
    /// Per-model failures are collected in [`InterpolatorOutput::failures`];
    /// only an invalid cadence or offset fails the whole call.
    pub fn interpolate(
        &self,
        input: &InterpolationInput,
    ) -> Result<InterpolatorOutput, InterpError> {
        if self.config.output_frequency_hours <= 0 {
            return Err(InterpError::InvalidCadence(
                self.config.output_frequency_hours,
            ));
        }

        let args = &input.args;
        if !within_horizon(args.fcst_hour_offset) {
            return Err(InterpError::InvalidOffset(args.fcst_hour_offset));
        }
        let truth = args.truth();

        let mut names: Vec<&str> = match &args.models {
            Some(models) => models.iter().map(String::as_str).collect(),
            None => input.model_data.keys().map(String::as_str).collect(),
        };
        let mut seen = std::collections::HashSet::new();
        names.retain(|n| seen.insert(*n));

        let jobs: Vec<(ModelContext<'_>, &BucketMap)> = names
            .into_iter()
            .filter_map(|name| {
                let buckets = input.model_data.get(name);
                let model = self.config.model(name);
                match (buckets, model) {
                    (Some(buckets), Some(model)) => Some((
                        ModelContext {
                            name,
                            model,
                            truth,
                            fcst_hour_offset: args.fcst_hour_offset,
                        },
                        buckets,
                    )),
                    _ => {
                        debug!(model = name, "model not configured or has no data; skipping");
                        None
                    }
                }
            })
            .collect();

        let results: Vec<(&ModelContext<'_>, Result<BucketMap, InterpError>)> = jobs
            .par_iter()
            .map(|(ctx, buckets)| (ctx, self.interpolate_model(ctx, buckets)))
            .collect();

        let mut model_data = ModelMap::new();
        let mut failures = Vec::new();
        for (ctx, result) in results {
            match result {
                Ok(buckets) => {
                    let out_name = ctx.model.output_name.clone();
                    if model_data.insert(out_name, buckets).is_some() {
                        warn!(
                            model = ctx.name,
                            output = %ctx.model.output_name,
                            "output name already produced by another model; replacing"
                        );
                    }
                }
                Err(err) => failures.push(err),
            }
        }

        Ok(InterpolatorOutput {
            dtg: args.dtg + Duration::hours(i64::from(args.fcst_hour_offset)),
            model_data,
            failures,
        })
    }

    /// Interpolate one model's buckets in ascending threshold order, threading
    /// the fallback offsets from bucket to bucket.
    fn interpolate_model(
        &self,
        ctx: &ModelContext<'_>,
        buckets: &BucketMap,
    ) -> Result<BucketMap, InterpError> {
        let mut out = BucketMap::new();
        let mut fallback: Option<BiasOffsets> = None;

        for (&bucket, data) in buckets {
            let (result, next) = self.interpolate_bucket(ctx, bucket, data, fallback)?;
            fallback = next;
            if let Some(result) = result {
                out.insert(bucket, result);
            }
        }
        Ok(out)
    }

    fn interpolate_bucket(
        &self,
        ctx: &ModelContext<'_>,
        bucket: WindRadiiBucket,
        data: &ModelData,
        fallback: Option<BiasOffsets>,
    ) -> Result<(Option<ModelData>, Option<BiasOffsets>), InterpError> {
        data.check_shape(ctx.name, bucket)?;
        if !is_strictly_ascending(&data.forecast_hour) {
            return Err(InterpError::UnorderedHours {
                model: ctx.name.to_string(),
                bucket,
            });
        }
        if let Some(&hour) = data.forecast_hour.iter().find(|&&h| !within_horizon(h)) {
            return Err(InterpError::HorizonExceeded {
                model: ctx.name.to_string(),
                bucket,
                hour,
            });
        }

        let Some(resampled) = resample(data) else {
            debug!(model = ctx.name, %bucket, "no forecast hours at or after 0; skipping bucket");
            return Ok((None, fallback));
        };

        let smoothed = smooth(&resampled.grid, self.config.n_smooth);
        let rebased = rebase(&smoothed, ctx.fcst_hour_offset);

        let found = compute_offsets(&rebased, &ctx.truth);
        let used_fallback = found.is_none();
        let (offsets, fallback) = resolve_offsets(ctx.name, found, fallback)?;

        let adjusted = apply_offsets(&rebased, &offsets, ctx.model);
        let anchored = force_truth(&adjusted, &ctx.truth);
        let output = decimate(
            &anchored,
            resampled.min_hour,
            self.config.output_frequency_hours,
        );

        debug!(
            model = ctx.name,
            %bucket,
            grid = rebased.len(),
            output = output.len(),
            used_fallback,
            "interpolated bucket"
        );

        Ok((Some(output), fallback))
    }
}

/// Shift grid hours so `fcst_hour_offset` becomes hour 0. Saturates at the
/// `i32` bounds.
pub fn rebase(grid: &ModelData, fcst_hour_offset: i32) -> ModelData {
    ModelData::new(
        grid.forecast_hour
            .iter()
            .map(|h| h.saturating_sub(fcst_hour_offset))
            .collect(),
        grid.fields.clone(),
    )
}
