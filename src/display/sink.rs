use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::assets::decode::encode_png;
use crate::assets::frames::FrameImage;
use crate::foundation::error::RunpaceResult;

/// Destination for the frame currently shown by the indicator.
///
/// `push_frame` is called with the index of the frame within the installed sequence, every time
/// the shown frame changes. Indices wrap around at the end of the sequence.
pub trait DisplaySink: Send {
    /// Show `frame` (the `index`-th frame of the current sequence).
    fn push_frame(&mut self, index: usize, frame: &FrameImage) -> RunpaceResult<()>;
}

/// In-memory sink for tests and debugging.
///
/// Records every push, so a sink built with [`InMemorySink::new`] grows for as long as the
/// animation runs. Long-running users should bound it with [`InMemorySink::with_limit`].
#[derive(Debug, Default)]
pub struct InMemorySink {
    pushed: Vec<(usize, FrameImage)>,
    limit: Option<usize>,
}

impl InMemorySink {
    /// Create an empty, unbounded sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink keeping only the `limit` most recent pushes (at least one).
    pub fn with_limit(limit: usize) -> Self {
        Self {
            pushed: Vec::new(),
            limit: Some(limit.max(1)),
        }
    }

    /// Retained pushed frames, oldest first.
    pub fn frames(&self) -> &[(usize, FrameImage)] {
        &self.pushed
    }

    /// Indices of the pushed frames, oldest first.
    pub fn indices(&self) -> Vec<usize> {
        self.pushed.iter().map(|(i, _)| *i).collect()
    }

    /// Most recently pushed frame.
    pub fn last(&self) -> Option<&(usize, FrameImage)> {
        self.pushed.last()
    }

    /// Forget recorded pushes, releasing the held frames.
    pub fn clear(&mut self) {
        self.pushed.clear();
    }
}

impl DisplaySink for InMemorySink {
    fn push_frame(&mut self, index: usize, frame: &FrameImage) -> RunpaceResult<()> {
        if let Some(limit) = self.limit {
            let excess = (self.pushed.len() + 1).saturating_sub(limit);
            self.pushed.drain(..excess);
        }
        self.pushed.push((index, frame.clone()));
        Ok(())
    }
}

/// Writes the current frame to a PNG file, replacing it atomically on every push.
///
/// Status bar integrations that watch an icon path (for example a panel applet) can point at
/// [`PngFileSink::path`].
#[derive(Debug)]
pub struct PngFileSink {
    path: PathBuf,
    tmp: PathBuf,
}

impl PngFileSink {
    /// Sink writing to `path`. The parent directory must exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        Self {
            path,
            tmp: PathBuf::from(tmp),
        }
    }

    /// Output file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DisplaySink for PngFileSink {
    fn push_frame(&mut self, _index: usize, frame: &FrameImage) -> RunpaceResult<()> {
        let png = encode_png(frame)?;
        std::fs::write(&self.tmp, &png)
            .with_context(|| format!("write icon file '{}'", self.tmp.display()))?;
        std::fs::rename(&self.tmp, &self.path)
            .with_context(|| format!("replace icon file '{}'", self.path.display()))?;
        Ok(())
    }
}

/// Sink that only logs frame changes at trace level.
#[derive(Debug, Default)]
pub struct LogSink {
    pushes: u64,
}

impl LogSink {
    /// Create a logging sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames pushed so far.
    pub fn pushes(&self) -> u64 {
        self.pushes
    }
}

impl DisplaySink for LogSink {
    fn push_frame(&mut self, index: usize, frame: &FrameImage) -> RunpaceResult<()> {
        self.pushes += 1;
        tracing::trace!(index, width = frame.width, height = frame.height, "frame shown");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/display/sink.rs"]
mod tests;
