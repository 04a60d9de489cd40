//! Per-frame motion rendering: draw-op planning, trails and raster backends.

/// Raster backend trait and frame output type.
pub mod backend;
/// `vello_cpu` raster backend.
pub mod cpu;
/// Per-frame motion driver.
pub mod motion;
/// Backend-agnostic draw list.
pub mod plan;
pub(crate) mod text;
/// Per-entity trail ring buffers.
pub mod trail;
