//! Indicator configuration and the periodic tasks that drive the core.

pub(crate) mod indicator;
pub(crate) mod settings;
