//! The interpolation engine.
//!
//! Stages live in their own modules so each can be tested on its own:
//!
//! - `resample`: 3-hour grid, decimation to the output cadence
//! - `smooth`: iterative 3-point smoother
//! - `bias`: zero-hour offsets, relaxation, truth forcing
//! - `engine`: per-model driver

pub mod bias;
pub mod engine;
pub mod resample;
pub mod smooth;

pub use engine::{Interpolator, rebase};
