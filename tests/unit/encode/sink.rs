use super::*;

use crate::foundation::core::Canvas;

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 4,
        height: 2,
        fps: Fps::new(30, 1).unwrap(),
    }
}

fn frame(rgb: [u8; 3]) -> FrameRGBA {
    FrameRGBA::solid(
        Canvas {
            width: 4,
            height: 2,
        },
        rgb,
    )
}

#[test]
fn identical_consecutive_frames_collapse_into_runs() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    let red = frame([255, 0, 0]);
    let blue = frame([0, 0, 255]);
    for i in 0..3 {
        sink.push_frame(FrameIndex(i), &red).unwrap();
    }
    for i in 3..5 {
        sink.push_frame(FrameIndex(i), &blue).unwrap();
    }
    sink.push_frame(FrameIndex(5), &red).unwrap();
    sink.end().unwrap();

    assert_eq!(sink.run_lengths(), vec![3, 2, 1]);
    assert_eq!(sink.frame_count(), 6);
    assert_eq!(sink.runs()[1].start, FrameIndex(3));
    assert_eq!(sink.runs()[1].frame, blue);
    assert!(sink.is_ended());
}

#[test]
fn clones_observe_the_same_record() {
    let observer = InMemorySink::new();
    let mut boxed: Box<dyn FrameSink> = Box::new(observer.clone());
    boxed.begin(cfg()).unwrap();
    boxed.push_frame(FrameIndex(0), &frame([1, 2, 3])).unwrap();
    assert_eq!(observer.config(), Some(cfg()));
    assert_eq!(observer.frame_count(), 1);
    assert!(!observer.is_ended());
}

#[test]
fn rejects_out_of_order_and_mis_sized_frames() {
    let mut sink = InMemorySink::new();
    assert!(sink.push_frame(FrameIndex(0), &frame([0, 0, 0])).is_err());

    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(1), &frame([0, 0, 0])).unwrap();
    assert!(sink.push_frame(FrameIndex(1), &frame([0, 0, 0])).is_err());

    let wrong = FrameRGBA::solid(
        Canvas {
            width: 2,
            height: 2,
        },
        [0, 0, 0],
    );
    assert!(sink.push_frame(FrameIndex(2), &wrong).is_err());
}
