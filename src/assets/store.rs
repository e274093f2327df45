use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::{
    assets::decode as assets_decode,
    assets::frames::{FrameImage, FrameKey, FrameSequence, SubjectSpec, Theme},
    foundation::error::{RunpaceError, RunpaceResult},
};

/// Immutable-after-load table of frame images keyed by `(theme, subject, index)`.
///
/// Lookups fall back from the dark theme to the light one, per frame index. Indices that resolve
/// in neither theme are skipped.
#[derive(Clone, Debug, Default)]
pub struct FrameSetRegistry {
    root: Option<PathBuf>,
    frames: HashMap<FrameKey, FrameImage>,
}

impl FrameSetRegistry {
    /// Empty registry, populated through [`FrameSetRegistry::insert`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `<theme>_<subject>_<index>.png` file directly under `root`.
    ///
    /// File names are matched case-insensitively. Files that do not follow the naming scheme are
    /// ignored; files that fail to decode are skipped with a warning. Only an unreadable
    /// directory is an error.
    #[tracing::instrument(skip(root), fields(dir = %root.as_ref().display()))]
    pub fn load_dir(root: impl AsRef<Path>) -> RunpaceResult<Self> {
        let root = root.as_ref();
        let mut out = Self {
            root: Some(root.to_path_buf()),
            frames: HashMap::new(),
        };

        let entries = std::fs::read_dir(root)
            .with_context(|| format!("read frame directory '{}'", root.display()))?;
        for entry in entries {
            let entry = entry.with_context(|| format!("list '{}'", root.display()))?;
            let path = entry.path();
            let Some(key) = key_for_path(&path) else {
                tracing::trace!(path = %path.display(), "ignoring non-frame file");
                continue;
            };

            let decoded = std::fs::read(&path)
                .with_context(|| format!("read frame '{}'", path.display()))
                .map_err(RunpaceError::from)
                .and_then(|bytes| assets_decode::decode_image(&bytes));
            match decoded {
                Ok(image) => {
                    out.frames.insert(key, image);
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping unreadable frame");
                }
            }
        }

        tracing::debug!(frames = out.frames.len(), "frame directory loaded");
        Ok(out)
    }

    /// Directory the registry was loaded from, if any.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Register (or replace) one frame.
    pub fn insert(&mut self, theme: Theme, subject: &str, index: usize, image: FrameImage) {
        self.frames
            .insert(FrameKey::new(theme, subject, index), image);
    }

    /// Number of registered frames across all themes and subjects.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Distinct subject names present in the registry, sorted.
    pub fn subjects(&self) -> Vec<String> {
        let mut names: Vec<String> = self.frames.keys().map(|k| k.subject.clone()).collect();
        names.sort();
        names.dedup();
        names
    }

    /// Frames `0..subject.frame_count` for `theme`, in index order.
    ///
    /// The result may be shorter than `frame_count`, or empty, when frames are missing.
    #[tracing::instrument(skip(self, subject), fields(subject = %subject.name))]
    pub fn resolve(&self, theme: Theme, subject: &SubjectSpec) -> FrameSequence {
        let frames: Vec<FrameImage> = (0..subject.frame_count)
            .filter_map(|i| self.lookup(theme, &subject.name, i).cloned())
            .collect();
        if frames.len() < subject.frame_count {
            tracing::debug!(
                resolved = frames.len(),
                expected = subject.frame_count,
                "frame set incomplete"
            );
        }
        FrameSequence::new(frames)
    }

    /// First frame of `subject` for `theme`, for previews. Same fallback as
    /// [`FrameSetRegistry::resolve`].
    pub fn resolve_thumbnail(&self, theme: Theme, subject: &SubjectSpec) -> Option<FrameImage> {
        self.lookup(theme, &subject.name, 0).cloned()
    }

    fn lookup(&self, theme: Theme, subject: &str, index: usize) -> Option<&FrameImage> {
        self.frames
            .get(&FrameKey::new(theme, subject, index))
            .or_else(|| match theme {
                Theme::Dark => self.frames.get(&FrameKey::new(Theme::Light, subject, index)),
                Theme::Light => None,
            })
    }
}

fn key_for_path(path: &Path) -> Option<FrameKey> {
    let ext = path.extension()?.to_str()?;
    if !ext.eq_ignore_ascii_case("png") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    FrameKey::parse_stem(&stem.to_ascii_lowercase())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
