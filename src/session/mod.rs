//! Per-reader composition root.

/// [`reader::ReaderSession`] and its options.
pub mod reader;
