//! Output surfaces for animation frames.

pub(crate) mod sink;
