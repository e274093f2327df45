//! Load-driven frame playback.

pub(crate) mod curve;
pub(crate) mod player;
