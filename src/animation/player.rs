use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::animation::curve::MAX_INTERVAL_MS;
use crate::assets::frames::FrameSequence;
use crate::display::sink::DisplaySink;

#[derive(Debug)]
struct PlaybackState<S> {
    sequence: FrameSequence,
    cursor: usize,
    sink: S,
}

impl<S: DisplaySink> PlaybackState<S> {
    fn show(&mut self, index: usize) {
        let Some(frame) = self.sequence.get(index) else {
            return;
        };
        if let Err(err) = self.sink.push_frame(index, frame) {
            tracing::warn!(index, error = %err, "display sink rejected frame");
        }
    }
}

/// Cycles the active frame sequence into a [`DisplaySink`].
///
/// The sequence, the cursor and the sink live behind one mutex, so [`AnimationPlayer::advance`]
/// and [`AnimationPlayer::replace_frames`] never interleave. The tick interval is a plain atomic
/// and can be retuned from any thread without taking the lock.
#[derive(Debug)]
pub struct AnimationPlayer<S> {
    state: Mutex<PlaybackState<S>>,
    interval_ms: AtomicU32,
}

impl<S: DisplaySink> AnimationPlayer<S> {
    /// Player with no frames installed, pushing into `sink`.
    pub fn new(sink: S, interval_ms: u32) -> Self {
        Self {
            state: Mutex::new(PlaybackState {
                sequence: FrameSequence::default(),
                cursor: 0,
                sink,
            }),
            interval_ms: AtomicU32::new(interval_ms.max(1)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PlaybackState<S>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Push the frame under the cursor and step forward, wrapping at the end.
    ///
    /// Returns `false` (and leaves the cursor alone) when no frames are installed.
    pub fn advance(&self) -> bool {
        let mut state = self.lock();
        let len = state.sequence.len();
        if len == 0 {
            return false;
        }
        if state.cursor >= len {
            state.cursor = 0;
        }
        let index = state.cursor;
        state.show(index);
        state.cursor = (index + 1) % len;
        true
    }

    /// Install `sequence` and show its first frame.
    ///
    /// An empty `sequence` is ignored and `false` is returned; the current animation keeps
    /// playing. The previous frames are dropped only after frame 0 of the new sequence has been
    /// pushed, all under the playback lock.
    pub fn replace_frames(&self, sequence: FrameSequence) -> bool {
        if sequence.is_empty() {
            tracing::debug!("ignoring empty frame sequence");
            return false;
        }
        let mut state = self.lock();
        let previous = std::mem::replace(&mut state.sequence, sequence);
        state.cursor = 0;
        state.show(0);
        tracing::debug!(
            frames = state.sequence.len(),
            replaced = previous.len(),
            "frame sequence installed"
        );
        drop(previous);
        true
    }

    /// Retune the tick period. Applies from the next wait on; `0` is treated as `1`.
    pub fn set_interval_ms(&self, ms: u32) {
        self.interval_ms.store(ms.max(1), Ordering::Relaxed);
    }

    /// Current tick period in milliseconds.
    pub fn interval_ms(&self) -> u32 {
        self.interval_ms.load(Ordering::Relaxed)
    }

    /// Current tick period.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.interval_ms()))
    }

    /// Index of the frame the next [`AnimationPlayer::advance`] will show.
    pub fn cursor(&self) -> usize {
        self.lock().cursor
    }

    /// Length of the installed sequence.
    pub fn frame_count(&self) -> usize {
        self.lock().sequence.len()
    }

    /// Run `f` against the sink while holding the playback lock.
    pub fn with_sink<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.lock().sink)
    }

    /// Drop the installed frames and reset the cursor. Used on shutdown.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.sequence = FrameSequence::default();
        state.cursor = 0;
    }
}

impl<S: DisplaySink + Default> Default for AnimationPlayer<S> {
    fn default() -> Self {
        Self::new(S::default(), MAX_INTERVAL_MS)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/player.rs"]
mod tests;
