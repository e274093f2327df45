use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::animation::curve::RatePreset;
use crate::assets::frames::{SubjectSpec, Theme, ThemePreference};
use crate::foundation::error::{RunpaceError, RunpaceResult};
use crate::metrics::counters::{CpuInstance, TOTAL_INSTANCE};
use crate::metrics::sampler::SamplerOpts;

/// Period of the sampling task.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleInterval {
    /// 500 ms.
    Fast,
    /// 1 s.
    #[default]
    Normal,
    /// 2 s.
    Slow,
    /// 5 s.
    VerySlow,
}

impl SampleInterval {
    /// All presets, fastest first.
    pub const ALL: [SampleInterval; 4] = [Self::Fast, Self::Normal, Self::Slow, Self::VerySlow];

    /// Period in milliseconds.
    pub fn millis(self) -> u64 {
        match self {
            Self::Fast => 500,
            Self::Normal => 1_000,
            Self::Slow => 2_000,
            Self::VerySlow => 5_000,
        }
    }

    /// Period as a [`Duration`].
    pub fn period(self) -> Duration {
        Duration::from_millis(self.millis())
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Normal => "normal",
            Self::Slow => "slow",
            Self::VerySlow => "very_slow",
        }
    }
}

impl fmt::Display for SampleInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SampleInterval {
    type Err = RunpaceError;

    fn from_str(s: &str) -> RunpaceResult<Self> {
        let norm = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == norm)
            .ok_or_else(|| {
                RunpaceError::validation(format!(
                    "unknown sample interval '{s}' (expected fast, normal, slow or very_slow)"
                ))
            })
    }
}

/// Indicator configuration supplied by the host application.
///
/// Missing JSON fields take their defaults. Settings are read-only here; persisting them is the
/// host's job.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// CPU instance identifier; `_Total` for the aggregate.
    pub cpu_instance: String,
    /// Theme selection.
    pub theme: ThemePreference,
    /// Theme reported by the host, used when `theme` is `system`.
    pub system_theme: Theme,
    /// Animated subject.
    pub subject: SubjectSpec,
    /// Speed multiplier preset.
    pub rate: RatePreset,
    /// Sampling task period.
    pub sample_interval: SampleInterval,
    /// Samples taken per consumed sample.
    pub decimation: u32,
    /// Frame interval before the first consumed sample.
    pub animate_interval_ms: u32,
    /// Rolling history length.
    pub history_capacity: usize,
    /// Upper bound on a single counter read.
    pub read_timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cpu_instance: TOTAL_INSTANCE.to_string(),
            theme: ThemePreference::default(),
            system_theme: Theme::default(),
            subject: SubjectSpec::default(),
            rate: RatePreset::default(),
            sample_interval: SampleInterval::default(),
            decimation: 5,
            animate_interval_ms: 200,
            history_capacity: 5,
            read_timeout_ms: 500,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> RunpaceResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| RunpaceError::config(format!("parse settings JSON: {e}")))
    }

    /// Parse settings from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> RunpaceResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            RunpaceError::config(format!("open settings '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Reject values the periodic tasks cannot run with.
    pub fn validate(&self) -> RunpaceResult<()> {
        self.subject
            .validate()
            .map_err(|e| RunpaceError::config(e.to_string()))?;
        if self.decimation == 0 {
            return Err(RunpaceError::config("decimation must be >= 1"));
        }
        if self.animate_interval_ms == 0 {
            return Err(RunpaceError::config("animate_interval_ms must be >= 1"));
        }
        if self.history_capacity == 0 {
            return Err(RunpaceError::config("history_capacity must be >= 1"));
        }
        if self.read_timeout_ms == 0 {
            return Err(RunpaceError::config("read_timeout_ms must be >= 1"));
        }
        Ok(())
    }

    /// Parsed [`Settings::cpu_instance`].
    pub fn instance(&self) -> CpuInstance {
        CpuInstance::parse(&self.cpu_instance)
    }

    /// Concrete theme after resolving `system`.
    pub fn resolved_theme(&self) -> Theme {
        self.theme.resolve(self.system_theme)
    }

    /// Sampler tuning derived from these settings.
    pub fn sampler_opts(&self) -> SamplerOpts {
        SamplerOpts {
            history_capacity: self.history_capacity,
            read_timeout: Duration::from_millis(self.read_timeout_ms),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/settings.rs"]
mod tests;
