//! Narration clip metadata.

/// Duration probing with fallback.
pub mod probe;
