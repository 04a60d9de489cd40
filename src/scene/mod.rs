//! Scene data: the JSON boundary model and its normalized runtime form.
//!
//! Batches arrive from the external analysis service once per document load. Everything here is
//! tolerant by construction: malformed fields resolve to documented defaults instead of failing
//! the batch.

/// Batch loading entry points.
pub mod batch;
pub(crate) mod model;
/// Normalized runtime types consumed by the engine.
pub mod waypoint;
