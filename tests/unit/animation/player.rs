use std::sync::Arc;

use super::*;
use crate::assets::frames::FrameImage;
use crate::display::sink::InMemorySink;
use crate::foundation::error::{RunpaceError, RunpaceResult};

fn frames(values: &[u8]) -> FrameSequence {
    values
        .iter()
        .map(|v| FrameImage::from_rgba8(1, 1, vec![*v, *v, *v, 255]).unwrap())
        .collect::<Vec<_>>()
        .into()
}

fn shown(player: &AnimationPlayer<InMemorySink>) -> Vec<u8> {
    player.with_sink(|s| s.frames().iter().map(|(_, f)| f.rgba8[0]).collect())
}

struct FailingSink;

impl DisplaySink for FailingSink {
    fn push_frame(&mut self, _index: usize, _frame: &FrameImage) -> RunpaceResult<()> {
        Err(RunpaceError::validation("display gone"))
    }
}

#[test]
fn advance_on_empty_is_noop() {
    let player = AnimationPlayer::new(InMemorySink::new(), 200);
    assert!(!player.advance());
    assert_eq!(player.cursor(), 0);
    assert!(shown(&player).is_empty());
}

#[test]
fn replace_shows_frame_zero_then_advance_cycles() {
    let player = AnimationPlayer::new(InMemorySink::new(), 200);
    assert!(player.replace_frames(frames(&[1, 2, 3])));
    assert_eq!(player.cursor(), 0);
    assert_eq!(shown(&player), vec![1]);

    for _ in 0..4 {
        assert!(player.advance());
    }
    assert_eq!(shown(&player), vec![1, 1, 2, 3, 1]);
    assert_eq!(player.cursor(), 1);
    assert_eq!(
        player.with_sink(|s| s.indices()),
        vec![0, 0, 1, 2, 0]
    );
}

#[test]
fn empty_replacement_keeps_current_animation() {
    let player = AnimationPlayer::new(InMemorySink::new(), 200);
    player.replace_frames(frames(&[1, 2, 3]));
    player.advance();
    player.advance();
    assert_eq!(player.cursor(), 2);

    assert!(!player.replace_frames(FrameSequence::default()));
    assert_eq!(player.cursor(), 2);
    assert_eq!(player.frame_count(), 3);
    player.advance();
    assert_eq!(shown(&player).last(), Some(&3));
}

#[test]
fn shorter_replacement_resets_cursor() {
    let player = AnimationPlayer::new(InMemorySink::new(), 200);
    player.replace_frames(frames(&[1, 2, 3, 4, 5]));
    for _ in 0..4 {
        player.advance();
    }
    assert_eq!(player.cursor(), 4);

    player.replace_frames(frames(&[7, 8]));
    assert_eq!(player.cursor(), 0);
    player.advance();
    player.advance();
    player.advance();
    assert_eq!(&shown(&player)[5..], &[7, 7, 8, 7]);
}

#[test]
fn repeated_replacement_does_not_leak_frames() {
    let seq = frames(&[1, 2]);
    let probe: Vec<FrameImage> = seq.iter().cloned().collect();
    let player = AnimationPlayer::new(crate::display::sink::LogSink::new(), 200);

    for _ in 0..5 {
        assert!(player.replace_frames(seq.clone()));
        assert_eq!(player.cursor(), 0);
        // seq + probe + the installed copy
        assert!(probe.iter().all(|f| f.share_count() == 3));
    }
}

#[test]
fn owned_frames_released_after_replacement() {
    let old = frames(&[1, 2]);
    let probe: Vec<FrameImage> = old.iter().cloned().collect();
    let player = AnimationPlayer::new(crate::display::sink::LogSink::new(), 200);
    player.replace_frames(old);
    assert!(probe.iter().all(|f| f.share_count() == 2));

    player.replace_frames(frames(&[3]));
    assert!(probe.iter().all(|f| f.share_count() == 1));
    assert_eq!(player.frame_count(), 1);

    player.clear();
    assert_eq!(player.frame_count(), 0);
    assert!(!player.advance());
}

#[test]
fn sink_errors_do_not_stop_playback() {
    let player = AnimationPlayer::new(FailingSink, 200);
    assert!(player.replace_frames(frames(&[1, 2])));
    assert!(player.advance());
    assert!(player.advance());
    assert_eq!(player.cursor(), 0);
}

#[test]
fn interval_is_atomic_and_never_zero() {
    let player = AnimationPlayer::new(InMemorySink::new(), 0);
    assert_eq!(player.interval_ms(), 1);
    player.set_interval_ms(25);
    assert_eq!(player.interval(), Duration::from_millis(25));
    player.set_interval_ms(0);
    assert_eq!(player.interval_ms(), 1);

    let d: AnimationPlayer<InMemorySink> = AnimationPlayer::default();
    assert_eq!(d.interval_ms(), 500);
}

#[test]
fn concurrent_advance_and_replace_stay_consistent() {
    let player = Arc::new(AnimationPlayer::new(crate::display::sink::LogSink::new(), 1));
    player.replace_frames(frames(&[1, 2, 3, 4, 5, 6]));

    let ticker = {
        let player = Arc::clone(&player);
        std::thread::spawn(move || {
            for _ in 0..2_000 {
                player.advance();
            }
        })
    };
    for i in 0..200 {
        let len = 1 + (i % 6);
        let values: Vec<u8> = (0..len as u8).collect();
        player.replace_frames(frames(&values));
        assert!(player.cursor() < player.frame_count());
    }
    ticker.join().unwrap();

    let total = player.with_sink(|s| s.pushes());
    assert!(total >= 2_000);
}
