//! CPU load sampling: counter sources, the rolling sample history and the sampler itself.

pub(crate) mod counters;
pub(crate) mod procfs;
pub(crate) mod sample;
pub(crate) mod sampler;
