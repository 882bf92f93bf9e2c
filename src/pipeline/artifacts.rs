use std::path::{Path, PathBuf};

/// Combined narration file name.
pub const COMBINED_AUDIO_FILE: &str = "combined_audio.mp3";
/// Concat manifest file name.
pub const CONCAT_LIST_FILE: &str = "concat_list.txt";

/// Files owned by one generation run.
///
/// Everything except `final_video` is temporary and removed when the run ends, whatever the
/// outcome.
#[derive(Clone, Debug)]
pub struct Artifacts {
    /// Silent frame sequence.
    pub temp_video: PathBuf,
    /// Concatenated narration.
    pub combined_audio: PathBuf,
    /// Ordered concat manifest.
    pub concat_list: PathBuf,
    /// Muxed output, the only file that outlives a successful run.
    pub final_video: PathBuf,
    silence: Vec<PathBuf>,
    dir: PathBuf,
}

impl Artifacts {
    /// Artifact paths for output base name `name` inside `dir`.
    pub fn new(dir: &Path, name: &str) -> Self {
        Self {
            temp_video: dir.join(format!("temp_{name}.mp4")),
            combined_audio: dir.join(COMBINED_AUDIO_FILE),
            concat_list: dir.join(CONCAT_LIST_FILE),
            final_video: dir.join(format!("{name}.mp4")),
            silence: Vec::new(),
            dir: dir.to_path_buf(),
        }
    }

    /// Register and return the path of the silent stand-in for section `index`.
    pub fn silence_clip(&mut self, index: usize) -> PathBuf {
        let path = self.dir.join(format!("silence_{index}.mp3"));
        if !self.silence.contains(&path) {
            self.silence.push(path.clone());
        }
        path
    }

    /// Every temporary path, whether or not it exists yet.
    pub fn temp_paths(&self) -> Vec<&Path> {
        let mut out = vec![
            self.temp_video.as_path(),
            self.combined_audio.as_path(),
            self.concat_list.as_path(),
        ];
        out.extend(self.silence.iter().map(PathBuf::as_path));
        out
    }

    /// Best-effort removal of temporary files. Failures are logged; returns how many failed.
    pub fn cleanup_temps(&self) -> usize {
        self.temp_paths()
            .into_iter()
            .filter(|p| !remove_if_present(p))
            .count()
    }

    /// Remove a partial final video after a failed mux.
    pub fn discard_final(&self) {
        remove_if_present(&self.final_video);
    }
}

/// Returns `false` only when the file exists and could not be removed.
fn remove_if_present(path: &Path) -> bool {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed artifact");
            true
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove artifact");
            false
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/artifacts.rs"]
mod tests;
