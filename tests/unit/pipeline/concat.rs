use super::*;

use std::cell::RefCell;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::error::{ToolFailure, ToolResult, ToolStage};

#[derive(Default)]
struct RecordingTools {
    manifest: RefCell<Option<String>>,
    silences: RefCell<Vec<(f64, PathBuf)>>,
    fail_concat: bool,
}

impl MediaToolchain for RecordingTools {
    fn open_video_stream(&self, _: &Path, _: SinkConfig) -> ReelResult<Box<dyn FrameSink>> {
        Err(ReelError::stream_open("unused"))
    }

    fn concatenate(&self, manifest: &Path, out_path: &Path) -> ToolResult<PathBuf> {
        *self.manifest.borrow_mut() = std::fs::read_to_string(manifest).ok();
        if self.fail_concat {
            return Err(ToolFailure::new(ToolStage::ConcatAudio, Some(1), "invalid data"));
        }
        std::fs::write(out_path, b"audio").unwrap();
        Ok(out_path.to_path_buf())
    }

    fn mux(&self, _: &Path, _: &Path, _: &Path) -> ToolResult<PathBuf> {
        Err(ToolFailure::new(ToolStage::Mux, None, "unused"))
    }

    fn synthesize_silence(&self, secs: f64, out_path: &Path) -> ToolResult<PathBuf> {
        self.silences.borrow_mut().push((secs, out_path.to_path_buf()));
        std::fs::write(out_path, b"silence").unwrap();
        Ok(out_path.to_path_buf())
    }
}

#[test]
fn manifest_lists_one_quoted_file_per_clip() {
    let text = render_concat_manifest(&[PathBuf::from("/a/0.mp3"), PathBuf::from("/a/1.mp3")]);
    assert_eq!(text, "file '/a/0.mp3'\nfile '/a/1.mp3'\n");
}

#[test]
fn single_quotes_in_paths_are_escaped() {
    let text = render_concat_manifest(&[PathBuf::from("/it's/here.mp3")]);
    assert_eq!(text, "file '/it'\\''s/here.mp3'\n");
    assert_eq!(
        parse_concat_manifest(&text),
        vec![PathBuf::from("/it's/here.mp3")]
    );
}

#[test]
fn parse_skips_comments_and_other_directives() {
    let text = "# header\nffconcat version 1.0\nfile '/x.mp3'\n\nduration 3\nfile '/y.mp3'\n";
    assert_eq!(
        parse_concat_manifest(text),
        vec![PathBuf::from("/x.mp3"), PathBuf::from("/y.mp3")]
    );
}

#[test]
fn concatenate_writes_absolute_ordered_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let tools = RecordingTools::default();
    let mut artifacts = Artifacts::new(dir.path(), "v");
    let clips: Vec<ClipSource> = (0..5)
        .map(|i| ClipSource::File(dir.path().join(format!("{i}.mp3"))))
        .collect();

    let out = AudioConcatenator::new(&tools)
        .concatenate(&clips, &mut artifacts)
        .unwrap();
    assert_eq!(out, artifacts.combined_audio);

    let manifest = tools.manifest.borrow().clone().unwrap();
    let listed = parse_concat_manifest(&manifest);
    assert_eq!(listed.len(), 5);
    assert!(listed.iter().all(|p| p.is_absolute()));
    for (i, p) in listed.iter().enumerate() {
        assert!(p.ends_with(format!("{i}.mp3")));
    }
}

#[test]
fn fallback_sections_get_synthesized_silence_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let tools = RecordingTools::default();
    let mut artifacts = Artifacts::new(dir.path(), "v");
    let clips = vec![
        ClipSource::File(dir.path().join("0.mp3")),
        ClipSource::Silence { index: 1, secs: 5.0 },
        ClipSource::File(dir.path().join("2.mp3")),
    ];

    AudioConcatenator::new(&tools)
        .concatenate(&clips, &mut artifacts)
        .unwrap();

    let silences = tools.silences.borrow();
    assert_eq!(silences.len(), 1);
    assert_eq!(silences[0].0, 5.0);
    assert_eq!(silences[0].1, dir.path().join("silence_1.mp3"));

    let listed = parse_concat_manifest(&tools.manifest.borrow().clone().unwrap());
    assert!(listed[1].ends_with("silence_1.mp3"));
    assert!(artifacts.temp_paths().contains(&silences[0].1.as_path()));
}

#[test]
fn concat_failure_is_an_external_tool_error() {
    let dir = tempfile::tempdir().unwrap();
    let tools = RecordingTools {
        fail_concat: true,
        ..RecordingTools::default()
    };
    let mut artifacts = Artifacts::new(dir.path(), "v");
    let err = AudioConcatenator::new(&tools)
        .concatenate(&[ClipSource::File(dir.path().join("0.mp3"))], &mut artifacts)
        .unwrap_err();
    let f = err.tool_failure().unwrap();
    assert_eq!(f.stage, ToolStage::ConcatAudio);
    assert_eq!(f.exit_code, Some(1));
}

#[test]
fn empty_clip_list_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let tools = RecordingTools::default();
    let mut artifacts = Artifacts::new(dir.path(), "v");
    assert!(matches!(
        AudioConcatenator::new(&tools).concatenate(&[], &mut artifacts),
        Err(ReelError::Validation(_))
    ));
}
