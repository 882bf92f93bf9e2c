use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert!(Fps::new(30000, 1001).is_ok());
}

#[test]
fn secs_to_frames_rounds_half_away_from_zero() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.secs_to_frames_round(3.0), 90);
    assert_eq!(fps.secs_to_frames_round(2.71), 81);
    assert_eq!(fps.secs_to_frames_round(0.05), 2);
    assert_eq!(fps.secs_to_frames_round(0.01), 0);
}

#[test]
fn secs_to_frames_maps_bad_input_to_zero() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.secs_to_frames_round(-1.0), 0);
    assert_eq!(fps.secs_to_frames_round(f64::NAN), 0);
    assert_eq!(fps.secs_to_frames_round(f64::INFINITY), 0);
}

#[test]
fn frames_to_secs_inverts_whole_frames() {
    let fps = Fps::new(30, 1).unwrap();
    assert!((fps.frames_to_secs(450) - 15.0).abs() < 1e-9);
    assert!((fps.frame_duration_secs() - 1.0 / 30.0).abs() < 1e-12);
}

#[test]
fn canvas_rgba_len_is_four_bytes_per_pixel() {
    let c = Canvas {
        width: 1080,
        height: 1920,
    };
    assert_eq!(c.rgba_len(), 1080 * 1920 * 4);
}
