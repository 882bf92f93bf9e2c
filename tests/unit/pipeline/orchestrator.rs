use super::*;

#[test]
fn stage_log_reports_last_entered_stage() {
    let mut log = StageLog::default();
    assert_eq!(log.current(), GenerationStage::Validating);
    log.enter(GenerationStage::Validating);
    log.enter(GenerationStage::WritingFrames);
    assert_eq!(log.current(), GenerationStage::WritingFrames);
    assert_eq!(
        log.visited,
        vec![GenerationStage::Validating, GenerationStage::WritingFrames]
    );
}

#[test]
fn publish_copies_under_the_same_name() {
    let out = tempfile::tempdir().unwrap();
    let shelf = tempfile::tempdir().unwrap();
    let final_video = out.path().join("Test_Video.mp4");
    std::fs::write(&final_video, b"mp4 bytes").unwrap();

    let dest = publish(&final_video, &shelf.path().join("final_video")).unwrap();
    assert_eq!(dest, shelf.path().join("final_video").join("Test_Video.mp4"));
    assert_eq!(std::fs::read(&dest).unwrap(), b"mp4 bytes");
    assert!(final_video.exists());
}

#[test]
fn publish_into_own_directory_keeps_contents() {
    let out = tempfile::tempdir().unwrap();
    let final_video = out.path().join("v.mp4");
    std::fs::write(&final_video, b"keep me").unwrap();

    let dest = publish(&final_video, out.path()).unwrap();
    assert_eq!(dest, final_video);
    assert_eq!(std::fs::read(&final_video).unwrap(), b"keep me");
}

#[test]
fn generator_rejects_invalid_config_up_front() {
    let config = ReelConfig {
        canvas_width: 1081,
        ..ReelConfig::default()
    };
    assert!(matches!(
        ReelGenerator::new(config),
        Err(ReelError::Validation(_))
    ));
}

fn plan_with(fallback: Option<FallbackReason>) -> SectionPlan {
    SectionPlan {
        section: SectionSpec {
            index: 2,
            image: PathBuf::from("img2.png"),
            overlay_text: Some("second".to_string()),
            audio: PathBuf::from("sesler/2_metin.mp3"),
        },
        duration_secs: 5.0,
        frame_count: 150,
        fallback,
    }
}

#[test]
fn only_missing_clips_become_silence() {
    assert_eq!(
        plan_with(Some(FallbackReason::Missing)).clip_source(),
        ClipSource::Silence {
            index: 2,
            secs: 5.0
        }
    );
    assert_eq!(
        plan_with(Some(FallbackReason::Unreadable)).clip_source(),
        ClipSource::File(PathBuf::from("sesler/2_metin.mp3"))
    );
    assert_eq!(
        plan_with(None).clip_source(),
        ClipSource::File(PathBuf::from("sesler/2_metin.mp3"))
    );
}
