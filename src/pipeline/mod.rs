//! The generation pipeline: frame writing, audio concatenation, muxing and the orchestrator that
//! drives them.

/// Temporary and final files of one run.
pub mod artifacts;
/// Narration concatenation.
pub mod concat;
/// Final audio/video mux.
pub mod mux;
/// Run state machine and entry point.
pub mod orchestrator;
/// Pipeline stages.
pub mod stage;
/// Section frame repetition.
pub mod writer;
