//! Error types.
//!
//! Two layers:
//!
//! - [`InterpError`]: failures raised by the interpolation core. These are
//!   scoped to a single model and the orchestration decides whether they abort
//!   the run.
//! - [`AppError`]: what the binary reports, carrying a process exit code.

use thiserror::Error;

use crate::domain::{MAX_FORECAST_HOUR, WindRadiiBucket};

/// Errors raised while interpolating one model's buckets.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpError {
    /// The first processed bucket has no zero hour after rebasing, so no bias
    /// offsets can be computed or borrowed.
    #[error(
        "model {model}: first bucket does not contain a zero hour \
         (after applying forecast hour offset)"
    )]
    Configuration { model: String },

    /// A field sequence does not line up with the forecast hours.
    #[error(
        "model {model} bucket {bucket}: field {field} has {len} values \
         but there are {hours} forecast hours"
    )]
    DataShape {
        model: String,
        bucket: WindRadiiBucket,
        hours: usize,
        field: usize,
        len: usize,
    },

    /// Forecast hours within a bucket must be strictly ascending.
    #[error("model {model} bucket {bucket}: forecast hours are not strictly ascending")]
    UnorderedHours {
        model: String,
        bucket: WindRadiiBucket,
    },

    /// A forecast hour lies outside the accepted horizon.
    #[error(
        "model {model} bucket {bucket}: forecast hour {hour} is outside ±{max} hours",
        max = MAX_FORECAST_HOUR
    )]
    HorizonExceeded {
        model: String,
        bucket: WindRadiiBucket,
        hour: i32,
    },

    /// The forecast hour offset lies outside the accepted horizon.
    #[error("forecast hour offset {0} is outside ±{max} hours", max = MAX_FORECAST_HOUR)]
    InvalidOffset(i32),

    /// The output cadence must be a positive number of hours.
    #[error("invalid output frequency: {0} hours (must be > 0)")]
    InvalidCadence(i32),
}

impl InterpError {
    /// Name of the model the error is scoped to, if any.
    pub fn model(&self) -> Option<&str> {
        match self {
            InterpError::Configuration { model }
            | InterpError::DataShape { model, .. }
            | InterpError::UnorderedHours { model, .. }
            | InterpError::HorizonExceeded { model, .. } => Some(model),
            InterpError::InvalidOffset(_) | InterpError::InvalidCadence(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<InterpError> for AppError {
    fn from(err: InterpError) -> Self {
        let code = match err {
            InterpError::InvalidCadence(_) | InterpError::InvalidOffset(_) => 2,
            _ => 4,
        };
        AppError::new(code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
