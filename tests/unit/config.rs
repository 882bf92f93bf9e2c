use super::*;

#[test]
fn defaults_match_vertical_reel_layout() {
    let c = ReelConfig::default();
    assert_eq!(
        c.canvas(),
        Canvas {
            width: 1080,
            height: 1920
        }
    );
    assert_eq!(c.fps, 30);
    assert_eq!(c.fallback_duration_secs, 5.0);
    assert_eq!(c.content_sections, 4);
    assert_eq!(c.style.band_height_px, 200);
    assert_eq!(c.style.band_alpha, 0.7);
    assert_eq!(c.style.title_font_px, 60.0);
    assert_eq!(c.style.content_font_px, 40.0);
    assert_eq!(c.default_audio_dir(), PathBuf::from("output").join("sesler"));
    c.validate().unwrap();
}

#[test]
fn partial_json_fills_in_defaults() {
    let c: ReelConfig = serde_json::from_str(
        r#"{ "canvas_width": 320, "canvas_height": 640, "title_style": "card",
             "style": { "band_alpha": 0.5 } }"#,
    )
    .unwrap();
    assert_eq!(c.canvas_width, 320);
    assert_eq!(c.fps, 30);
    assert_eq!(c.title_style, TitleStyle::Card);
    assert_eq!(c.style.band_alpha, 0.5);
    assert_eq!(c.style.band_height_px, 200);
    c.validate().unwrap();
}

#[test]
fn odd_or_zero_canvas_is_rejected() {
    let mut c = ReelConfig {
        canvas_width: 1081,
        ..ReelConfig::default()
    };
    assert!(matches!(c.validate(), Err(ReelError::Validation(_))));
    c.canvas_width = 0;
    assert!(c.validate().is_err());
    c.canvas_width = 70_000;
    assert!(c.validate().is_err());
}

#[test]
fn bad_timing_values_are_rejected() {
    for c in [
        ReelConfig {
            fps: 0,
            ..ReelConfig::default()
        },
        ReelConfig {
            fallback_duration_secs: 0.0,
            ..ReelConfig::default()
        },
        ReelConfig {
            fallback_duration_secs: f64::NAN,
            ..ReelConfig::default()
        },
        ReelConfig {
            tool_timeout_secs: Some(0),
            ..ReelConfig::default()
        },
        ReelConfig {
            content_sections: 0,
            ..ReelConfig::default()
        },
    ] {
        assert!(c.validate().is_err(), "{c:?}");
    }
}

#[test]
fn style_must_fit_canvas() {
    let mut c = ReelConfig {
        canvas_width: 200,
        canvas_height: 200,
        ..ReelConfig::default()
    };
    assert!(c.validate().is_err());

    c.canvas_height = 400;
    c.style.band_alpha = 1.5;
    assert!(c.validate().is_err());

    c.style.band_alpha = 0.7;
    c.validate().unwrap();
}

#[test]
fn tool_timeout_none_disables_bound() {
    let c = ReelConfig {
        tool_timeout_secs: None,
        ..ReelConfig::default()
    };
    assert_eq!(c.tool_timeout(), None);
    assert_eq!(
        ReelConfig::default().tool_timeout(),
        Some(Duration::from_secs(600))
    );
}
