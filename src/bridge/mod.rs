//! Scroll synchronization between an embedded document and the host.
//!
//! The embedded side ([`reporter`]) computes scroll progress and posts coalesced reports through a
//! [`transport::Transport`]. The host side ([`scroll_bridge`]) filters, throttles and forwards
//! them, and degrades quietly when the document cannot be instrumented.

/// Time sources for throttling.
pub mod clock;
/// Embedded-document reporter and the document seam.
pub mod reporter;
/// Host-side bridge state machine.
pub mod scroll_bridge;
/// Message envelopes and transports.
pub mod transport;
