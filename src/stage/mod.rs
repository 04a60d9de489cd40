//! Stage space: where on the viewport the overlay may place entities without covering content.

/// Grid sampler and nearest-free-sample snapping.
pub mod index;
