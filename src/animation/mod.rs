/// Easing curves applied to looped scene progress.
pub mod ease;
