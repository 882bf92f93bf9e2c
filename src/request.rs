use std::path::{Path, PathBuf};

use crate::foundation::error::{ReelError, ReelResult};

/// File name of the title narration clip.
pub const TITLE_AUDIO_FILE: &str = "0_ana_baslik.mp3";

/// Base name used when the sanitized title is empty.
pub const FALLBACK_OUTPUT_NAME: &str = "video";

const OUTPUT_NAME_MAX_CHARS: usize = 50;

/// Narration file name for section `index` (0 = title).
pub fn narration_file_name(index: usize) -> String {
    if index == 0 {
        TITLE_AUDIO_FILE.to_string()
    } else {
        format!("{index}_metin.mp3")
    }
}

/// Turn a free-form title into a file base name.
///
/// Keeps alphanumerics, spaces, hyphens and underscores, replaces spaces with underscores and
/// truncates to 50 characters. An empty result becomes [`FALLBACK_OUTPUT_NAME`].
pub fn sanitize_title(title: &str) -> String {
    let name: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .map(|c| if c == ' ' { '_' } else { c })
        .take(OUTPUT_NAME_MAX_CHARS)
        .collect();
    if name.is_empty() {
        FALLBACK_OUTPUT_NAME.to_string()
    } else {
        name
    }
}

/// Section text as delivered by the scripting step: either final text, or a heading and body that
/// are joined as `"heading: body"`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum SectionText {
    /// Ready-to-draw text.
    Plain(String),
    /// Heading and body.
    Titled {
        /// Short section heading.
        heading: String,
        /// Section body.
        body: String,
    },
}

impl SectionText {
    /// Text drawn in the section's band.
    pub fn render(&self) -> String {
        match self {
            Self::Plain(s) => s.clone(),
            Self::Titled { heading, body } => format!("{heading}: {body}"),
        }
    }
}

impl From<&str> for SectionText {
    fn from(s: &str) -> Self {
        Self::Plain(s.to_string())
    }
}

/// Inputs of one generation run.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GenerationRequest {
    /// Reel title, drawn on the title section and used to name the output.
    pub title: String,
    /// Title image followed by one image per content section.
    pub images: Vec<PathBuf>,
    /// One text per content section.
    pub texts: Vec<SectionText>,
    /// Directory holding the narration clips; `<output_dir>/<audio_dir_name>` when unset.
    #[serde(default)]
    pub audio_dir: Option<PathBuf>,
}

/// One `(image, text_or_none, audio)` triple, in output order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionSpec {
    /// 0 for the title section, then 1..=N.
    pub index: usize,
    /// Background still.
    pub image: PathBuf,
    /// Band text; `None` for the title section, which draws the reel title instead.
    pub overlay_text: Option<String>,
    /// Narration clip that sets the section's duration.
    pub audio: PathBuf,
}

impl SectionSpec {
    /// `true` for the title section.
    pub fn is_title(&self) -> bool {
        self.overlay_text.is_none()
    }
}

impl GenerationRequest {
    /// Build a request with the default narration directory.
    pub fn new(
        title: impl Into<String>,
        images: Vec<PathBuf>,
        texts: Vec<SectionText>,
    ) -> Self {
        Self {
            title: title.into(),
            images,
            texts,
            audio_dir: None,
        }
    }

    /// Use `dir` as the narration directory.
    pub fn with_audio_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.audio_dir = Some(dir.into());
        self
    }

    /// Check the request shape for `content_sections` content sections.
    ///
    /// Does not touch the filesystem; see [`GenerationRequest::validate_audio_dir`].
    pub fn validate(&self, content_sections: usize) -> ReelResult<()> {
        if self.title.trim().is_empty() {
            return Err(ReelError::validation("title must be non-empty"));
        }
        if self.images.len() != content_sections + 1 {
            return Err(ReelError::validation(format!(
                "images: expected {} (1 title + {content_sections} content), got {}",
                content_sections + 1,
                self.images.len()
            )));
        }
        if self.texts.len() != content_sections {
            return Err(ReelError::validation(format!(
                "texts: expected {content_sections}, got {}",
                self.texts.len()
            )));
        }
        if let Some(i) = self
            .images
            .iter()
            .position(|p| p.as_os_str().is_empty())
        {
            return Err(ReelError::validation(format!("images[{i}] is an empty path")));
        }
        Ok(())
    }

    /// Resolve the narration directory against `default_dir` and require that it exists.
    pub fn validate_audio_dir(&self, default_dir: &Path) -> ReelResult<PathBuf> {
        let dir = self
            .audio_dir
            .clone()
            .unwrap_or_else(|| default_dir.to_path_buf());
        if !dir.is_dir() {
            return Err(ReelError::validation(format!(
                "audio_dir: '{}' is not a directory",
                dir.display()
            )));
        }
        Ok(dir)
    }

    /// Sanitized output base name.
    pub fn output_name(&self) -> String {
        sanitize_title(&self.title)
    }

    /// Ordered section triples: the title section first, then content sections 1..=N.
    pub fn sections(&self, audio_dir: &Path) -> Vec<SectionSpec> {
        self.images
            .iter()
            .enumerate()
            .map(|(index, image)| SectionSpec {
                index,
                image: image.clone(),
                overlay_text: index
                    .checked_sub(1)
                    .and_then(|t| self.texts.get(t))
                    .map(SectionText::render),
                audio: audio_dir.join(narration_file_name(index)),
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../tests/unit/request.rs"]
mod tests;
