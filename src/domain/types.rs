//! Core value types for the interpolator.
//!
//! Everything here is plain data: the engine replaces `ModelData` values stage
//! by stage rather than mutating shared state.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::InterpError;

/// Deck value meaning "not reported".
pub const MISSING: f32 = -9999.0;

/// Longest forecast horizon accepted, in hours (16 days), on either side of
/// hour 0. Applies to forecast hours and to the forecast hour offset.
pub const MAX_FORECAST_HOUR: i32 = 384;

/// True if `hour` lies within the accepted forecast horizon.
pub fn within_horizon(hour: i32) -> bool {
    (-MAX_FORECAST_HOUR..=MAX_FORECAST_HOUR).contains(&hour)
}

/// Number of tracked fields per sample.
pub const N_FIELDS: usize = 7;

/// Truth vector with no component set (no correction for any field).
pub const NO_TRUTH: [f32; N_FIELDS] = [f32::NAN; N_FIELDS];

/// Map the deck missing sentinel to NaN.
pub fn from_deck_missing(v: f32) -> f32 {
    if v != MISSING { v } else { f32::NAN }
}

/// Map NaN back to the deck missing sentinel.
pub fn to_deck_missing(v: f32) -> f32 {
    if !v.is_nan() { v } else { MISSING }
}

/// The seven tracked fields, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Lat,
    Lon,
    WindMax,
    Quad1WindRad,
    Quad2WindRad,
    Quad3WindRad,
    Quad4WindRad,
}

impl Field {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Wind-radii threshold a bucket of samples describes.
///
/// Ordering is by threshold, which is also the order buckets of one model are
/// processed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WindRadiiBucket {
    Kt34,
    Kt50,
    Kt64,
}

impl WindRadiiBucket {
    pub const ALL: [WindRadiiBucket; 3] = [
        WindRadiiBucket::Kt34,
        WindRadiiBucket::Kt50,
        WindRadiiBucket::Kt64,
    ];

    /// Threshold in knots, as it appears in the deck `rad_wind` column.
    pub fn threshold(self) -> f32 {
        match self {
            WindRadiiBucket::Kt34 => 34.0,
            WindRadiiBucket::Kt50 => 50.0,
            WindRadiiBucket::Kt64 => 64.0,
        }
    }

    /// Exact match on the deck threshold value.
    pub fn from_threshold(rad_wind: f32) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.threshold() == rad_wind)
    }
}

impl fmt::Display for WindRadiiBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}kt", self.threshold() as i32)
    }
}

/// One model's samples for one wind-radii bucket.
///
/// `fields[f][i]` is the value of field `f` at `forecast_hour[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelData {
    pub forecast_hour: Vec<i32>,
    pub fields: [Vec<f32>; N_FIELDS],
}

impl ModelData {
    pub fn new(forecast_hour: Vec<i32>, fields: [Vec<f32>; N_FIELDS]) -> Self {
        Self {
            forecast_hour,
            fields,
        }
    }

    pub fn len(&self) -> usize {
        self.forecast_hour.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forecast_hour.is_empty()
    }

    pub fn field(&self, field: Field) -> &[f32] {
        &self.fields[field.index()]
    }

    /// Verify every field sequence matches the number of forecast hours.
    pub fn check_shape(&self, model: &str, bucket: WindRadiiBucket) -> Result<(), InterpError> {
        let hours = self.forecast_hour.len();
        for (field, values) in self.fields.iter().enumerate() {
            if values.len() != hours {
                return Err(InterpError::DataShape {
                    model: model.to_string(),
                    bucket,
                    hours,
                    field,
                    len: values.len(),
                });
            }
        }
        Ok(())
    }
}

/// Buckets of one model, iterated in ascending threshold order.
pub type BucketMap = BTreeMap<WindRadiiBucket, ModelData>;

/// Model name -> buckets.
pub type ModelMap = BTreeMap<String, BucketMap>;

/// Per-run arguments for the interpolator.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolationArgs {
    /// Cycle time of the model forecasts being interpolated.
    pub dtg: DateTime<Utc>,
    /// Hours between the model cycle and the official analysis time.
    pub fcst_hour_offset: i32,
    /// Current storm values; NaN components request no correction.
    pub initial_fields: Option<[f32; N_FIELDS]>,
    /// Restrict processing to these models (input names).
    pub models: Option<Vec<String>>,
}

impl InterpolationArgs {
    pub fn new(dtg: DateTime<Utc>) -> Self {
        Self {
            dtg,
            fcst_hour_offset: 0,
            initial_fields: None,
            models: None,
        }
    }

    /// Truth vector used by the engine.
    pub fn truth(&self) -> [f32; N_FIELDS] {
        self.initial_fields.unwrap_or(NO_TRUTH)
    }
}

/// Engine input: arguments plus bucketed model data keyed by input name.
#[derive(Debug, Clone)]
pub struct InterpolationInput {
    pub args: InterpolationArgs,
    pub model_data: ModelMap,
}

/// Engine output keyed by output model name.
#[derive(Debug, Clone)]
pub struct InterpolatorOutput {
    /// Cycle time shifted by the forecast hour offset.
    pub dtg: DateTime<Utc>,
    pub model_data: ModelMap,
    /// Models that could not be interpolated.
    pub failures: Vec<InterpError>,
}
