/// States of one generation run, visited in declaration order.
///
/// A failed run stops at the stage that was active when the error happened; the error carries that
/// stage (see [`crate::ReelError::stage`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GenerationStage {
    /// Request, configuration and font checks. No artifacts exist yet.
    Validating,
    /// Composing section frames and streaming them into the silent video.
    WritingFrames,
    /// Building the concat manifest and joining narration clips.
    ConcatenatingAudio,
    /// Combining the silent video with the combined audio track.
    Muxing,
    /// Best-effort removal of temporary artifacts.
    Cleaning,
    /// Optional copy of the final video into the publish directory.
    Publishing,
    /// Terminal success state.
    Done,
}

impl std::fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Validating => "validating",
            Self::WritingFrames => "writing frames",
            Self::ConcatenatingAudio => "concatenating audio",
            Self::Muxing => "muxing",
            Self::Cleaning => "cleaning",
            Self::Publishing => "publishing",
            Self::Done => "done",
        })
    }
}
