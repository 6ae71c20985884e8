//! `atcf-interp` library crate.
//!
//! Turns irregular per-model tropical cyclone forecasts (A-deck records) into
//! regularly spaced, smoothed, bias-corrected tracks.
//!
//! The binary (`atcf-interp`) is a thin wrapper around this library so that:
//!
//! - the interpolation core is testable without spawning processes
//! - other front-ends can call [`app::interpolate_records`] directly

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod interp;
pub mod io;
pub mod logging;
pub mod select;
