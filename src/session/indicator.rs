use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::Context;

use crate::animation::curve::{RatePreset, compute_interval_ms};
use crate::animation::player::AnimationPlayer;
use crate::assets::frames::{FrameImage, SubjectSpec, Theme, ThemePreference};
use crate::assets::store::FrameSetRegistry;
use crate::display::sink::DisplaySink;
use crate::foundation::error::RunpaceResult;
use crate::metrics::counters::{CounterProvider, CpuInstance};
use crate::metrics::sample::LoadSample;
use crate::metrics::sampler::MetricSampler;
use crate::session::settings::Settings;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
struct MetricsState {
    sampler: MetricSampler,
    ticks: u32,
}

#[derive(Clone, Debug)]
struct Selection {
    theme: ThemePreference,
    system_theme: Theme,
    subject: SubjectSpec,
    rate: RatePreset,
}

impl Selection {
    fn theme(&self) -> Theme {
        self.theme.resolve(self.system_theme)
    }
}

/// What readers see of the sampler without waiting on an in-flight counter read.
#[derive(Clone, Debug, Default)]
struct Snapshot {
    latest: LoadSample,
    instance: CpuInstance,
}

// Lock order: metrics -> snapshot, selection -> player.
#[derive(Debug)]
struct Shared<S> {
    player: AnimationPlayer<S>,
    metrics: Mutex<MetricsState>,
    snapshot: Mutex<Snapshot>,
    selection: Mutex<Selection>,
    registry: Arc<FrameSetRegistry>,
    decimation: u32,
    sample_period: Duration,
}

impl<S: DisplaySink> Shared<S> {
    fn fast_tick(&self) -> bool {
        self.player.advance()
    }

    fn slow_tick(&self) -> Option<u32> {
        let (sample, instance) = {
            let mut metrics = lock(&self.metrics);
            let sample = metrics.sampler.sample();
            *lock(&self.snapshot) = Snapshot {
                latest: sample,
                instance: metrics.sampler.instance().clone(),
            };
            metrics.ticks = metrics.ticks.saturating_add(1);
            if metrics.ticks < self.decimation {
                return None;
            }
            metrics.ticks = 0;
            (metrics.sampler.latest(), metrics.sampler.instance().clone())
        };

        let (frame_count, rate) = {
            let sel = lock(&self.selection);
            (sel.subject.frame_count, sel.rate)
        };
        let interval = compute_interval_ms(sample.total, frame_count, rate.rate());
        self.player.set_interval_ms(interval);
        tracing::debug!(
            instance = %instance,
            load = sample.total,
            interval_ms = interval,
            indicator = %sample.indicator_lines().join(" | "),
            "load consumed"
        );
        Some(interval)
    }

    /// Resolve and install frames for `sel`. Callers hold the selection lock throughout, so
    /// concurrent selection changes install their frames in the order they were made.
    fn install_frames(&self, sel: &Selection) -> bool {
        let theme = sel.theme();
        let subject = &sel.subject;
        let frames = self.registry.resolve(theme, subject);
        if frames.is_empty() {
            tracing::warn!(
                theme = %theme,
                subject = %subject.name,
                "no frames resolved, keeping current animation"
            );
        }
        self.player.replace_frames(frames)
    }
}

#[derive(Debug)]
struct Workers {
    stop_fast: mpsc::Sender<()>,
    stop_slow: mpsc::Sender<()>,
    fast: JoinHandle<()>,
    slow: JoinHandle<()>,
}

/// The running indicator: a sampler feeding the speed curve, and a player cycling frames into a
/// sink.
///
/// Two periodic tasks drive it. The fast task calls [`IndicatorSession::fast_tick`] once per
/// frame interval. The slow task calls [`IndicatorSession::slow_tick`] once per sample period and
/// retunes the frame interval every `decimation` ticks. Both can be driven manually (for tests or
/// a host event loop) or on background threads via [`IndicatorSession::start`].
#[derive(Debug)]
pub struct IndicatorSession<S: DisplaySink + 'static> {
    shared: Arc<Shared<S>>,
    workers: Option<Workers>,
}

impl<S: DisplaySink + 'static> IndicatorSession<S> {
    /// Open counters for the configured instance and install the configured frame set.
    ///
    /// Fails on invalid settings, or when neither the configured instance nor the aggregate can
    /// be opened. A frame set that resolves to nothing is not an error; the player simply stays
    /// idle until a later selection resolves.
    #[tracing::instrument(skip_all, fields(instance = %settings.cpu_instance, subject = %settings.subject.name))]
    pub fn new(
        settings: &Settings,
        provider: Arc<dyn CounterProvider>,
        registry: Arc<FrameSetRegistry>,
        sink: S,
    ) -> RunpaceResult<Self> {
        settings.validate()?;
        let sampler =
            MetricSampler::initialize(provider, settings.instance(), settings.sampler_opts())?;

        let snapshot = Snapshot {
            latest: sampler.latest(),
            instance: sampler.instance().clone(),
        };
        let shared = Arc::new(Shared {
            player: AnimationPlayer::new(sink, settings.animate_interval_ms),
            metrics: Mutex::new(MetricsState {
                sampler,
                ticks: settings.decimation,
            }),
            snapshot: Mutex::new(snapshot),
            selection: Mutex::new(Selection {
                theme: settings.theme,
                system_theme: settings.system_theme,
                subject: settings.subject.clone(),
                rate: settings.rate,
            }),
            registry,
            decimation: settings.decimation,
            sample_period: settings.sample_interval.period(),
        });
        shared.install_frames(&lock(&shared.selection));
        tracing::info!(frames = shared.player.frame_count(), "indicator session ready");

        Ok(Self {
            shared,
            workers: None,
        })
    }

    /// Advance the animation by one frame. Returns `false` when no frames are installed.
    pub fn fast_tick(&self) -> bool {
        self.shared.fast_tick()
    }

    /// Take one sample. Every `decimation`-th call also consumes the latest sample and retunes
    /// the frame interval, returning the new interval.
    ///
    /// The first call always consumes.
    pub fn slow_tick(&self) -> Option<u32> {
        self.shared.slow_tick()
    }

    /// Spawn the fast and slow tasks. No-op when already running.
    pub fn start(&mut self) -> RunpaceResult<()> {
        if self.workers.is_some() {
            return Ok(());
        }

        let (stop_fast, fast_rx) = mpsc::channel::<()>();
        let shared = Arc::clone(&self.shared);
        let fast = std::thread::Builder::new()
            .name("runpace-animate".to_string())
            .spawn(move || {
                while let Err(RecvTimeoutError::Timeout) =
                    fast_rx.recv_timeout(shared.player.interval())
                {
                    shared.fast_tick();
                }
            })
            .context("spawn animation thread")?;

        let (stop_slow, slow_rx) = mpsc::channel::<()>();
        let shared = Arc::clone(&self.shared);
        let slow = std::thread::Builder::new()
            .name("runpace-sample".to_string())
            .spawn(move || {
                while let Err(RecvTimeoutError::Timeout) = slow_rx.recv_timeout(shared.sample_period)
                {
                    shared.slow_tick();
                }
            })
            .context("spawn sampling thread");
        let slow = match slow {
            Ok(handle) => handle,
            Err(err) => {
                drop(stop_fast);
                let _ = fast.join();
                return Err(err.into());
            }
        };

        self.workers = Some(Workers {
            stop_fast,
            stop_slow,
            fast,
            slow,
        });
        tracing::info!(
            sample_period_ms = self.shared.sample_period.as_millis() as u64,
            decimation = self.shared.decimation,
            "indicator started"
        );
        Ok(())
    }

    /// Whether the background tasks are running.
    pub fn is_running(&self) -> bool {
        self.workers.is_some()
    }

    /// Stop both tasks, wait for them, and release the installed frames.
    pub fn shutdown(&mut self) -> RunpaceResult<()> {
        let mut res = Ok(());
        if let Some(w) = self.workers.take() {
            drop(w.stop_fast);
            drop(w.stop_slow);
            if w.fast.join().is_err() {
                res = Err(anyhow::anyhow!("animation thread panicked").into());
            }
            if w.slow.join().is_err() {
                res = Err(anyhow::anyhow!("sampling thread panicked").into());
            }
            tracing::info!("indicator stopped");
        }
        self.shared.player.clear();
        res
    }

    /// Change the theme preference and swap in the matching frames.
    pub fn set_theme(&self, theme: ThemePreference) -> bool {
        let mut sel = lock(&self.shared.selection);
        sel.theme = theme;
        self.shared.install_frames(&sel)
    }

    /// Record a host theme change. Frames are swapped only when the resolved theme changes.
    pub fn set_system_theme(&self, system_theme: Theme) -> bool {
        let mut sel = lock(&self.shared.selection);
        let before = sel.theme();
        sel.system_theme = system_theme;
        sel.theme() != before && self.shared.install_frames(&sel)
    }

    /// Switch the animated subject.
    ///
    /// When the new subject resolves to no frames the previous animation keeps playing, but the
    /// new subject's frame count already applies to the speed curve.
    pub fn set_subject(&self, subject: SubjectSpec) -> RunpaceResult<bool> {
        subject.validate()?;
        let mut sel = lock(&self.shared.selection);
        sel.subject = subject;
        Ok(self.shared.install_frames(&sel))
    }

    /// Change the rate preset. Takes effect at the next consumed sample.
    pub fn set_rate(&self, rate: RatePreset) {
        lock(&self.shared.selection).rate = rate;
    }

    /// Sample another CPU instance (with the usual fallback to the aggregate).
    ///
    /// Waits for an in-flight counter read, at most the configured read timeout.
    pub fn set_instance(&self, instance: CpuInstance) -> RunpaceResult<()> {
        let mut metrics = lock(&self.shared.metrics);
        let res = metrics.sampler.change_instance(instance);
        lock(&self.shared.snapshot).instance = metrics.sampler.instance().clone();
        res
    }

    /// Instance currently sampled.
    pub fn instance(&self) -> CpuInstance {
        lock(&self.shared.snapshot).instance.clone()
    }

    /// Selectable CPU instances, aggregate first.
    ///
    /// Like [`IndicatorSession::set_instance`], this waits for an in-flight counter read.
    pub fn available_instances(&self) -> Vec<CpuInstance> {
        lock(&self.shared.metrics).sampler.available_instances()
    }

    /// Most recent sample. Never waits on a counter read.
    pub fn latest(&self) -> LoadSample {
        lock(&self.shared.snapshot).latest
    }

    /// Tooltip text for the latest sample, e.g. `CPU: 12.3%`.
    pub fn status_text(&self) -> String {
        let snap = lock(&self.shared.snapshot);
        snap.latest.description(&snap.instance)
    }

    /// Concrete theme in use.
    pub fn theme(&self) -> Theme {
        lock(&self.shared.selection).theme()
    }

    /// Current subject.
    pub fn subject(&self) -> SubjectSpec {
        lock(&self.shared.selection).subject.clone()
    }

    /// Current rate preset.
    pub fn rate(&self) -> RatePreset {
        lock(&self.shared.selection).rate
    }

    /// Preview image for `subject` in the current theme.
    pub fn thumbnail(&self, subject: &SubjectSpec) -> Option<FrameImage> {
        self.shared.registry.resolve_thumbnail(self.theme(), subject)
    }

    /// The player driven by this session.
    pub fn player(&self) -> &AnimationPlayer<S> {
        &self.shared.player
    }
}

impl<S: DisplaySink + 'static> Drop for IndicatorSession<S> {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            tracing::warn!(error = %err, "indicator shutdown failed");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/indicator.rs"]
mod tests;
