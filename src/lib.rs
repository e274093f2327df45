//! Runpace is a live CPU-load indicator.
//!
//! A [`MetricSampler`] reads CPU counters on a fixed cadence, [`compute_interval_ms`] turns the
//! latest load into a frame interval, and an [`AnimationPlayer`] cycles a themed icon animation
//! into a [`DisplaySink`] at that interval. Busier machines animate faster.
//!
//! - Load frames into a [`FrameSetRegistry`] (usually from a directory of PNG files)
//! - Describe the indicator with [`Settings`]
//! - Create an [`IndicatorSession`] and either [`IndicatorSession::start`] it or drive its ticks
//!   from a host event loop
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod assets;
mod display;
mod foundation;
mod metrics;
mod session;

pub use crate::foundation::core::{PERCENT_MAX, clamp_percent};
pub use crate::foundation::error::{RunpaceError, RunpaceResult};

pub use crate::animation::curve::{
    EXTENDED_FRAME_THRESHOLD, MAX_INTERVAL_MS, RatePreset, compute_interval_ms, speed,
};
pub use crate::animation::player::AnimationPlayer;
pub use crate::assets::decode::{decode_image, encode_png};
pub use crate::assets::frames::{
    FrameImage, FrameKey, FrameSequence, SubjectSpec, Theme, ThemePreference,
};
pub use crate::assets::store::FrameSetRegistry;
pub use crate::display::sink::{DisplaySink, InMemorySink, LogSink, PngFileSink};
pub use crate::metrics::counters::{
    CounterProvider, CpuCounters, CpuInstance, RawLoad, TOTAL_INSTANCE, list_available_instances,
};
pub use crate::metrics::procfs::ProcStatProvider;
pub use crate::metrics::sample::{HISTORY_CAPACITY, LoadSample, SampleHistory};
pub use crate::metrics::sampler::{MetricSampler, SamplerOpts};
pub use crate::session::indicator::IndicatorSession;
pub use crate::session::settings::{SampleInterval, Settings};
