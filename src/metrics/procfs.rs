//! Linux counter source backed by `/proc/stat`.
//!
//! `/proc/stat` exposes cumulative jiffy counters per CPU line (`cpu` for the aggregate, `cpuN`
//! per core). Load over an interval is the delta between two readings.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::core::percent_of;
use crate::foundation::error::{RunpaceError, RunpaceResult};
use crate::metrics::counters::{CounterProvider, CpuCounters, CpuInstance, RawLoad};

/// Default location of the kernel statistics file.
pub const PROC_STAT_PATH: &str = "/proc/stat";

/// Cumulative jiffy counters from one `cpu*` line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct CpuTimes {
    pub(crate) user: u64,
    pub(crate) nice: u64,
    pub(crate) system: u64,
    pub(crate) idle: u64,
    pub(crate) iowait: u64,
    pub(crate) irq: u64,
    pub(crate) softirq: u64,
    pub(crate) steal: u64,
}

impl CpuTimes {
    fn total(&self) -> u64 {
        self.user
            .saturating_add(self.nice)
            .saturating_add(self.system)
            .saturating_add(self.idle)
            .saturating_add(self.iowait)
            .saturating_add(self.irq)
            .saturating_add(self.softirq)
            .saturating_add(self.steal)
    }

    /// Load between `prev` and `self`. Counter wraparound or resets produce zero deltas.
    pub(crate) fn load_since(&self, prev: &CpuTimes) -> RawLoad {
        let dt = self.total().saturating_sub(prev.total());
        if dt == 0 {
            return RawLoad {
                user: 0.0,
                kernel: 0.0,
                idle: 100.0,
            };
        }
        let d = |now: u64, before: u64| now.saturating_sub(before);
        let user = d(self.user, prev.user) + d(self.nice, prev.nice);
        let kernel =
            d(self.system, prev.system) + d(self.irq, prev.irq) + d(self.softirq, prev.softirq);
        let idle = d(self.idle, prev.idle) + d(self.iowait, prev.iowait);
        RawLoad {
            user: percent_of(user, dt),
            kernel: percent_of(kernel, dt),
            idle: percent_of(idle, dt),
        }
    }
}

/// Parse one `/proc/stat` line into its label (`cpu`, `cpu0`, ...) and counters.
///
/// Returns `None` for non-CPU lines or lines with fewer than four counters.
pub(crate) fn parse_cpu_line(line: &str) -> Option<(&str, CpuTimes)> {
    let mut parts = line.split_whitespace();
    let label = parts.next()?;
    if !label.starts_with("cpu") {
        return None;
    }
    let vals: Vec<u64> = parts.map_while(|s| s.parse::<u64>().ok()).collect();
    if vals.len() < 4 {
        return None;
    }
    let at = |i: usize| vals.get(i).copied().unwrap_or(0);
    Some((
        label,
        CpuTimes {
            user: at(0),
            nice: at(1),
            system: at(2),
            idle: at(3),
            iowait: at(4),
            irq: at(5),
            softirq: at(6),
            steal: at(7),
        },
    ))
}

fn stat_label(instance: &CpuInstance) -> String {
    match instance {
        CpuInstance::Total => "cpu".to_string(),
        CpuInstance::Core(id) => format!("cpu{id}"),
    }
}

/// [`CounterProvider`] reading a `/proc/stat`-formatted file.
#[derive(Clone, Debug)]
pub struct ProcStatProvider {
    path: PathBuf,
}

impl Default for ProcStatProvider {
    fn default() -> Self {
        Self::new(PROC_STAT_PATH)
    }
}

impl ProcStatProvider {
    /// Provider reading from `path` instead of the default `/proc/stat`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the statistics file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_stat(&self) -> RunpaceResult<String> {
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("read cpu statistics '{}'", self.path.display()))?;
        Ok(raw)
    }
}

impl CounterProvider for ProcStatProvider {
    fn open(&self, instance: &CpuInstance) -> RunpaceResult<Box<dyn CpuCounters>> {
        let label = stat_label(instance);
        let raw = self.read_stat()?;
        let baseline = find_times(&raw, &label).ok_or_else(|| {
            RunpaceError::counter(format!("cpu instance '{instance}' not found"))
        })?;
        Ok(Box::new(ProcStatCounters {
            path: self.path.clone(),
            label,
            prev: baseline,
        }))
    }

    fn instances(&self) -> RunpaceResult<Vec<String>> {
        let raw = self.read_stat()?;
        Ok(raw
            .lines()
            .filter_map(parse_cpu_line)
            .filter_map(|(label, _)| label.strip_prefix("cpu"))
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect())
    }
}

fn find_times(raw: &str, label: &str) -> Option<CpuTimes> {
    raw.lines()
        .filter_map(parse_cpu_line)
        .find(|(l, _)| *l == label)
        .map(|(_, times)| times)
}

/// Open counters for one `/proc/stat` line.
struct ProcStatCounters {
    path: PathBuf,
    label: String,
    prev: CpuTimes,
}

impl CpuCounters for ProcStatCounters {
    fn read(&mut self) -> RunpaceResult<RawLoad> {
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("read cpu statistics '{}'", self.path.display()))?;
        let now = find_times(&raw, &self.label).ok_or_else(|| {
            RunpaceError::counter(format!("cpu line '{}' disappeared", self.label))
        })?;
        let load = now.load_since(&self.prev);
        self.prev = now;
        Ok(load)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/metrics/procfs.rs"]
mod tests;
