//! Shared data structures for the puller calculator
//!
//! - `CalculationInput`: validated operator input
//! - `CalculationOutput`: the four values returned on the wire
//! - `PullerReport`: every intermediate of one calculation
//! - `CalculationError`: operator-facing failure kinds

mod calculation;

pub use calculation::*;
