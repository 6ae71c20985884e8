//! Input/output helpers.
//!
//! - deck records as JSON (`records`)
//! - CSV export of interpolated records (`export`)

pub mod export;
pub mod records;

pub use export::*;
pub use records::*;
