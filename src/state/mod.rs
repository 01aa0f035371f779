//! State module for tracking run progress
//!
//! # Components
//!
//! - `RunState`: the phase a pipeline run is in (discovering, harvesting, ...)
//! - `CategoryOutcome`: how one category's pagination loop ended

mod outcome;
mod run_state;

// Re-export main types
pub use outcome::CategoryOutcome;
pub use run_state::RunState;
