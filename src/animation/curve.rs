//! Load -> playback interval mapping.
//!
//! Speed is a dimensionless multiplier of the base cadence: a speed of `s` plays one frame every
//! `500 / s` milliseconds. Two regimes exist, chosen by the subject's frame count:
//!
//! - **Extended** (`frame_count >= 30`): `[0, 50]%` load maps linearly onto speed `[1, 20]`,
//!   `(50, 100]%` onto `[20, 40]`, then the result is scaled by `rate`. The 50% boundary belongs
//!   to the lower segment.
//! - **Base** (`frame_count < 30`): `max(1, load / 5 * rate)`.
//!
//! A larger `rate` yields a shorter interval. The FPS-limit presets therefore scale speed up.

use std::fmt;
use std::str::FromStr;

use crate::foundation::core::clamp_percent;
use crate::foundation::error::{RunpaceError, RunpaceResult};

/// Frame count at which the extended curve applies.
pub const EXTENDED_FRAME_THRESHOLD: usize = 30;

/// Interval at speed 1 (and the largest interval ever returned).
pub const MAX_INTERVAL_MS: u32 = 500;

const MIN_SPEED: f32 = 1.0;
const KNEE_LOAD: f32 = 50.0;
const KNEE_SPEED: f32 = 20.0;
const TOP_SPEED: f32 = 40.0;

/// Playback speed for `load_percent` before the final `max(1, s)` floor.
///
/// `load_percent` is clamped into `[0, 100]` first.
pub fn speed(load_percent: f32, frame_count: usize, rate: f32) -> f32 {
    let load = clamp_percent(load_percent);
    if frame_count >= EXTENDED_FRAME_THRESHOLD {
        let s = if load <= KNEE_LOAD {
            MIN_SPEED + (load / KNEE_LOAD) * (KNEE_SPEED - MIN_SPEED)
        } else {
            KNEE_SPEED + ((load - KNEE_LOAD) / KNEE_LOAD) * (TOP_SPEED - KNEE_SPEED)
        };
        s * rate
    } else {
        ((load / 5.0) * rate).max(MIN_SPEED)
    }
}

/// Frame interval in milliseconds for the given load, subject frame count and rate multiplier.
///
/// Always in `[1, 500]`.
pub fn compute_interval_ms(load_percent: f32, frame_count: usize, rate: f32) -> u32 {
    let s = speed(load_percent, frame_count, rate);
    let s = if s.is_nan() { MIN_SPEED } else { s.max(MIN_SPEED) };
    let ms = (MAX_INTERVAL_MS as f32 / s).floor() as u32;
    ms.clamp(1, MAX_INTERVAL_MS)
}

/// FPS-limit presets, slowest first. Each maps to a speed multiplier for [`compute_interval_ms`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RatePreset {
    /// 10 fps, rate 0.25.
    Fps10,
    /// 20 fps, rate 0.5.
    Fps20,
    /// 30 fps, rate 0.75.
    Fps30,
    /// 40 fps, rate 1.0.
    #[default]
    Fps40,
}

impl RatePreset {
    /// All presets, slowest first.
    pub const ALL: [RatePreset; 4] = [Self::Fps10, Self::Fps20, Self::Fps30, Self::Fps40];

    /// Speed multiplier.
    pub fn rate(self) -> f32 {
        match self {
            Self::Fps10 => 0.25,
            Self::Fps20 => 0.5,
            Self::Fps30 => 0.75,
            Self::Fps40 => 1.0,
        }
    }

    /// Menu label, e.g. `40fps`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Fps10 => "10fps",
            Self::Fps20 => "20fps",
            Self::Fps30 => "30fps",
            Self::Fps40 => "40fps",
        }
    }
}

impl fmt::Display for RatePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RatePreset {
    type Err = RunpaceError;

    fn from_str(s: &str) -> RunpaceResult<Self> {
        let norm = s.trim().to_ascii_lowercase();
        let norm = norm.strip_suffix("fps").unwrap_or(&norm);
        match norm {
            "10" => Ok(Self::Fps10),
            "20" => Ok(Self::Fps20),
            "30" => Ok(Self::Fps30),
            "40" => Ok(Self::Fps40),
            _ => Err(RunpaceError::validation(format!(
                "unknown rate preset '{s}' (expected 10fps, 20fps, 30fps or 40fps)"
            ))),
        }
    }
}

impl TryFrom<String> for RatePreset {
    type Error = RunpaceError;

    fn try_from(s: String) -> RunpaceResult<Self> {
        s.parse()
    }
}

impl From<RatePreset> for String {
    fn from(p: RatePreset) -> Self {
        p.label().to_string()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/curve.rs"]
mod tests;
