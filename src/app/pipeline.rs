//! Deck-record interpolation pipeline shared by the CLI and library callers.
//!
//! records -> selection/bucketing -> engine -> synthesized A-deck records
//!
//! This layer resolves the pieces the engine takes as given (configuration,
//! truth vector, storm identity) and turns engine output back into flat,
//! canonically ordered deck records. It does no I/O.

use tracing::{info, warn};

use crate::config::Configuration;
use crate::domain::{
    DeckRecord, INTERPOLATED_TECHNIQUE_NUM, InterpolationArgs, InterpolationInput,
    InterpolatorOutput, RAD_WIND_QUAD_NEQ, Storm, sort_adeck, to_deck_missing,
};
use crate::error::InterpError;
use crate::interp::Interpolator;
use crate::select::{SelectionStats, select_model_data};

/// What to do when a model cannot be interpolated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModelErrorPolicy {
    /// Log the failure and continue with the remaining models.
    #[default]
    Skip,
    /// Fail the whole run on the first model failure.
    Abort,
}

/// All outputs of one interpolation run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub records: Vec<DeckRecord>,
    /// Models skipped because of an engine error (empty under `Abort`).
    pub failures: Vec<InterpError>,
    pub selection: SelectionStats,
}

impl RunOutput {
    /// Input names of the models that were skipped.
    pub fn failed_models(&self) -> Vec<&str> {
        self.failures.iter().filter_map(InterpError::model).collect()
    }
}

/// Interpolate A-deck records for one cycle.
///
/// - `storm`: if given, only records of this storm are used and output records
///   carry its identity; otherwise identity comes from the first input record.
/// - `initial`: current storm values; overrides `args.initial_fields`.
/// - `config`: `None` uses the permissive default (no models configured).
///
/// Input records are not modified.
pub fn interpolate_records(
    storm: Option<&Storm>,
    args: &InterpolationArgs,
    records: &[DeckRecord],
    initial: Option<&DeckRecord>,
    config: Option<&Configuration>,
    policy: ModelErrorPolicy,
) -> Result<RunOutput, InterpError> {
    let default_config;
    let config = match config {
        Some(config) => config,
        None => {
            default_config = Configuration::default();
            &default_config
        }
    };

    let selection = select_model_data(records, args.dtg, storm, config, args.models.as_deref());
    info!(
        read = selection.stats.records_read,
        used = selection.stats.records_used,
        models = selection.model_data.len(),
        dropped_buckets = selection.stats.buckets_dropped,
        "selected deck records"
    );

    let mut args = args.clone();
    if let Some(initial) = initial {
        args.initial_fields = Some(initial.truth_fields());
    }

    let input = InterpolationInput {
        args,
        model_data: selection.model_data,
    };
    let output = Interpolator::new(config).interpolate(&input)?;

    for failure in &output.failures {
        warn!(
            model = failure.model().unwrap_or("-"),
            error = %failure,
            "model not interpolated"
        );
    }
    if policy == ModelErrorPolicy::Abort {
        if let Some(failure) = output.failures.first() {
            return Err(failure.clone());
        }
    }

    let storm = storm
        .cloned()
        .or_else(|| records.first().map(Storm::from_record))
        .unwrap_or_default();

    let mut out_records = to_deck_records(&output, &storm);
    sort_adeck(&mut out_records);
    info!(
        models = output.model_data.len(),
        records = out_records.len(),
        "synthesized interpolated records"
    );

    Ok(RunOutput {
        records: out_records,
        failures: output.failures,
        selection: selection.stats,
    })
}

/// Flatten engine output into deck records, one per model, bucket and hour.
pub fn to_deck_records(output: &InterpolatorOutput, storm: &Storm) -> Vec<DeckRecord> {
    let mut out = Vec::new();
    for (model_name, buckets) in &output.model_data {
        for (bucket, data) in buckets {
            for (r, &fcst_hour) in data.forecast_hour.iter().enumerate() {
                let value = |f: usize| to_deck_missing(data.fields[f][r]);
                out.push(DeckRecord {
                    ref_time: output.dtg,
                    year: storm.year,
                    basin: storm.basin.clone(),
                    cyclone_num: storm.cyclone_num,
                    technique_num: INTERPOLATED_TECHNIQUE_NUM,
                    technique: model_name.clone(),
                    fcst_hour,
                    clat: value(0),
                    clon: value(1),
                    wind_max: value(2),
                    mslp: 0.0,
                    intensity: String::new(),
                    rad_wind: bucket.threshold(),
                    rad_wind_quad: RAD_WIND_QUAD_NEQ.to_string(),
                    quad1_wind_rad: value(3),
                    quad2_wind_rad: value(4),
                    quad3_wind_rad: value(5),
                    quad4_wind_rad: value(6),
                });
            }
        }
    }
    out
}
