//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - deck records and storm identity (`DeckRecord`, `Storm`)
//! - the bucketed per-model containers the engine works on (`ModelData`)
//! - run arguments and engine input/output

pub mod deck;
pub mod types;

pub use deck::*;
pub use types::*;
