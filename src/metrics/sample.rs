use std::collections::VecDeque;

use crate::foundation::core::{PERCENT_MAX, clamp_percent};
use crate::metrics::counters::{CpuInstance, RawLoad};

/// Default number of samples retained by a [`SampleHistory`].
pub const HISTORY_CAPACITY: usize = 5;

/// One CPU load observation, every field a percentage in `[0, 100]`.
///
/// `total` is always derived as `100 - idle`; `user` and `kernel` are reported independently and
/// are not required to add up to `total`.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct LoadSample {
    /// Busy share (`100 - idle`).
    pub total: f32,
    /// Time spent in user mode.
    pub user: f32,
    /// Time spent in kernel mode.
    pub kernel: f32,
    /// Idle share.
    pub idle: f32,
}

impl LoadSample {
    /// Build a sample from raw counter values, clamping each one into `[0, 100]`.
    pub fn from_raw(raw: RawLoad) -> Self {
        let idle = clamp_percent(raw.idle);
        Self {
            total: PERCENT_MAX - idle,
            user: clamp_percent(raw.user),
            kernel: clamp_percent(raw.kernel),
            idle,
        }
    }

    /// Sample recorded when the counters could not be read.
    pub fn degraded() -> Self {
        Self {
            total: 0.0,
            user: 0.0,
            kernel: 0.0,
            idle: PERCENT_MAX,
        }
    }

    /// Short one-line summary, e.g. `CPU: 12.5%` or `CPU 3: 80.0%`.
    pub fn description(&self, instance: &CpuInstance) -> String {
        match instance {
            CpuInstance::Total => format!("CPU: {:.1}%", self.total),
            CpuInstance::Core(id) => format!("CPU {id}: {:.1}%", self.total),
        }
    }

    /// Multi-line breakdown suitable for an info panel.
    pub fn indicator_lines(&self) -> Vec<String> {
        vec![
            format!("CPU: {:.1}%", self.total),
            format!("   ├─ User: {:.1}%", self.user),
            format!("   ├─ Kernel: {:.1}%", self.kernel),
            format!("   └─ Available: {:.1}%", self.idle),
        ]
    }
}

/// Fixed-capacity rolling window of [`LoadSample`]s; the oldest entry is evicted on overflow.
#[derive(Clone, Debug)]
pub struct SampleHistory {
    capacity: usize,
    samples: VecDeque<LoadSample>,
}

impl Default for SampleHistory {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

impl SampleHistory {
    /// Create an empty history. A zero capacity is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity + 1),
        }
    }

    /// Append a sample, evicting from the front once over capacity.
    pub fn push(&mut self, sample: LoadSample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Most recent sample, if any.
    pub fn latest(&self) -> Option<LoadSample> {
        self.samples.back().copied()
    }

    /// Samples in insertion order, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &LoadSample> {
        self.samples.iter()
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no sample has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Maximum number of retained samples.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
#[path = "../../tests/unit/metrics/sample.rs"]
mod tests;
