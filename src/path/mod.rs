//! Motion paths through scene layout hints.

/// Catmull-Rom path planner with optional stage snapping.
pub mod planner;
