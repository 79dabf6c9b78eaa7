//! Cleanup pipeline: exclusion matching, artifact lookup, planning, parallel deletion.

pub mod deletion;
pub mod exclusion;
pub mod locator;
pub mod pipeline;
pub mod planner;
