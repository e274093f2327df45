use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::foundation::error::{RunpaceError, RunpaceResult};

#[derive(Clone, Debug, PartialEq, Eq)]
/// Decoded icon frame in straight-alpha RGBA8.
///
/// Pixel storage is shared: clones are cheap and the bytes are released when the last clone is
/// dropped.
pub struct FrameImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major RGBA8.
    pub rgba8: Arc<Vec<u8>>,
}

impl FrameImage {
    /// Wrap raw RGBA8 pixels, validating the buffer length.
    pub fn from_rgba8(width: u32, height: u32, rgba8: Vec<u8>) -> RunpaceResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| RunpaceError::validation("frame dimensions overflow"))?;
        if rgba8.len() != expected {
            return Err(RunpaceError::validation(format!(
                "frame buffer is {} bytes, expected {expected} for {width}x{height}",
                rgba8.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8: Arc::new(rgba8),
        })
    }

    /// Number of live handles to this frame's pixel storage.
    pub fn share_count(&self) -> usize {
        Arc::strong_count(&self.rgba8)
    }
}

/// Ordered frames of one animation, as installed into an
/// [`AnimationPlayer`](crate::AnimationPlayer).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameSequence {
    frames: Vec<FrameImage>,
}

impl FrameSequence {
    /// Build a sequence from frames in playback order.
    pub fn new(frames: Vec<FrameImage>) -> Self {
        Self { frames }
    }

    /// Frame count.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the sequence holds no frame.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame at `index`.
    pub fn get(&self, index: usize) -> Option<&FrameImage> {
        self.frames.get(index)
    }

    /// Frames in playback order.
    pub fn iter(&self) -> impl Iterator<Item = &FrameImage> {
        self.frames.iter()
    }
}

impl From<Vec<FrameImage>> for FrameSequence {
    fn from(frames: Vec<FrameImage>) -> Self {
        Self::new(frames)
    }
}

/// Concrete icon theme. Dark variants fall back to light ones when missing.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Icons for light backgrounds.
    #[default]
    Light,
    /// Icons for dark backgrounds.
    Dark,
}

impl Theme {
    /// Lowercase asset prefix (`light` / `dark`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = RunpaceError;

    fn from_str(s: &str) -> RunpaceResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(RunpaceError::validation(format!("unknown theme '{s}'"))),
        }
    }
}

/// User-facing theme selection; `System` follows the host's theme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    /// Follow the host theme.
    #[default]
    System,
    /// Always light.
    Light,
    /// Always dark.
    Dark,
}

impl ThemePreference {
    /// Concrete theme given the host-reported `system` theme.
    pub fn resolve(self, system: Theme) -> Theme {
        match self {
            Self::System => system,
            Self::Light => Theme::Light,
            Self::Dark => Theme::Dark,
        }
    }
}

impl FromStr for ThemePreference {
    type Err = RunpaceError;

    fn from_str(s: &str) -> RunpaceResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "system" => Ok(Self::System),
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(RunpaceError::validation(format!(
                "unknown theme preference '{s}'"
            ))),
        }
    }
}

/// The animated figure: asset name plus its total frame count.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SubjectSpec {
    /// Asset name, matched case-insensitively.
    pub name: String,
    /// Frames in one animation cycle.
    pub frame_count: usize,
}

impl SubjectSpec {
    /// Build a subject. The name is stored lowercase.
    pub fn new(name: impl Into<String>, frame_count: usize) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            frame_count,
        }
    }

    /// Reject empty names and zero frame counts.
    pub fn validate(&self) -> RunpaceResult<()> {
        if self.name.trim().is_empty() {
            return Err(RunpaceError::validation("subject name must be non-empty"));
        }
        if self.frame_count == 0 {
            return Err(RunpaceError::validation(format!(
                "subject '{}' must have at least one frame",
                self.name
            )));
        }
        Ok(())
    }
}

impl Default for SubjectSpec {
    fn default() -> Self {
        Self::new("cat", 5)
    }
}

/// Registry key for one frame image.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameKey {
    /// Theme variant.
    pub theme: Theme,
    /// Lowercase subject name.
    pub subject: String,
    /// Frame index within the cycle.
    pub index: usize,
}

impl FrameKey {
    /// Build a key, lowercasing `subject`.
    pub fn new(theme: Theme, subject: &str, index: usize) -> Self {
        Self {
            theme,
            subject: subject.to_ascii_lowercase(),
            index,
        }
    }

    /// Parse an asset file stem of the form `<theme>_<subject>_<index>`.
    ///
    /// The subject may itself contain underscores.
    pub fn parse_stem(stem: &str) -> Option<Self> {
        let (theme, rest) = stem.split_once('_')?;
        let (subject, index) = rest.rsplit_once('_')?;
        if subject.is_empty() {
            return None;
        }
        let theme = theme.parse::<Theme>().ok()?;
        let index = index.parse::<usize>().ok()?;
        Some(Self::new(theme, subject, index))
    }
}

impl fmt::Display for FrameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.theme, self.subject, self.index)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/frames.rs"]
mod tests;
