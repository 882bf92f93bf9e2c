//! Encoding sinks and external media tool plumbing.
//!
//! Everything that spawns `ffmpeg` lives here; the rest of the crate talks to it through
//! [`toolchain::MediaToolchain`] and [`sink::FrameSink`].

/// `ffmpeg`-based sink and toolchain.
pub mod ffmpeg;
/// Bounded subprocess execution.
pub(crate) mod process;
/// Frame sink trait and the in-memory sink.
pub mod sink;
/// Media toolchain seam.
pub mod toolchain;
