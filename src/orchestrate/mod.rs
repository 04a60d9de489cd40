//! Scroll fraction to active scene resolution.

/// Windowed state machine over a waypoint batch.
pub mod waypoints;
