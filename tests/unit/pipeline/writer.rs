use super::*;

use crate::encode::sink::{InMemorySink, SinkConfig};
use crate::foundation::core::Canvas;

fn fps30() -> Fps {
    Fps::new(30, 1).unwrap()
}

#[test]
fn frame_count_is_rounded_duration_times_fps() {
    assert_eq!(frame_count_for(3.0, fps30()), 90);
    assert_eq!(frame_count_for(2.71, fps30()), 81);
    assert_eq!(frame_count_for(5.0, fps30()), 150);
}

#[test]
fn frame_count_is_at_least_one() {
    assert_eq!(frame_count_for(0.001, fps30()), 1);
    assert_eq!(frame_count_for(0.0, fps30()), 1);
}

#[test]
fn sections_are_written_back_to_back_in_order() {
    let canvas = Canvas {
        width: 2,
        height: 2,
    };
    let mut sink = InMemorySink::new();
    sink.begin(SinkConfig {
        width: 2,
        height: 2,
        fps: fps30(),
    })
    .unwrap();

    let a = FrameRGBA::solid(canvas, [1, 1, 1]);
    let b = FrameRGBA::solid(canvas, [2, 2, 2]);
    let mut writer = SectionFrameWriter::new(&mut sink);
    assert_eq!(writer.write_section(&a, 90).unwrap(), 90);
    assert_eq!(writer.write_section(&b, 81).unwrap(), 81);
    assert_eq!(writer.frames_written(), 171);

    assert_eq!(sink.run_lengths(), vec![90, 81]);
    assert_eq!(sink.runs()[1].start.0, 90);
}

#[test]
fn sink_errors_stop_the_section() {
    let mut sink = InMemorySink::new();
    let frame = FrameRGBA::solid(
        Canvas {
            width: 2,
            height: 2,
        },
        [0, 0, 0],
    );
    let mut writer = SectionFrameWriter::new(&mut sink);
    assert!(writer.write_section(&frame, 3).is_err());
    assert_eq!(writer.frames_written(), 0);
}
